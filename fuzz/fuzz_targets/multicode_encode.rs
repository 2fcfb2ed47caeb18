use honggfuzz::fuzz;

fn main() {
    loop {
        fuzz!(|data: &[u8]| {
            let Some((&correction_symbols, data)) = data.split_first() else {
                return;
            };
            let correction_symbols = usize::from(correction_symbols % 32);
            let encoded = multicode::encode(data, correction_symbols);
            let decoded = multicode::decode(&encoded, data.len(), correction_symbols).unwrap();
            assert_eq!(data, decoded);
        });
    }
}
