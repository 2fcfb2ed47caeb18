use honggfuzz::fuzz;

fn main() {
    loop {
        fuzz!(|data: &[u8]| {
            let Some((&params, text)) = data.split_first() else {
                return;
            };
            if let Ok(text) = core::str::from_utf8(text) {
                let data_len = usize::from(params >> 4);
                let correction_symbols = usize::from(params & 0x0f);
                multicode::decode(text, data_len, correction_symbols).ok();
            }
        });
    }
}
