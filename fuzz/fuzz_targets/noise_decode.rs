use honggfuzz::fuzz;
use multicode::noise::Noise;

// One copying mistake in a code of at most 15 symbols is always recovered.
fn main() {
    loop {
        fuzz!(|data: &[u8]| {
            if data.len() < 2 || data.len() > 7 {
                return;
            }
            let payload = &data[1..];
            let correction_symbols = 2 + usize::from(data[0]) % (14 - 2 * payload.len());
            let code = multicode::encode(payload, correction_symbols);
            let seed = format!("{data:?}");
            let damaged = Noise::from(seed.as_str()).damage(&code, 1);
            let decoded = multicode::decode(&damaged, payload.len(), correction_symbols);
            assert_eq!(decoded.as_deref(), Ok(payload));
        });
    }
}
