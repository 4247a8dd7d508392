use iridium_burst_decoder::burst::parse_line;
use iridium_burst_decoder::decoder::{decode, DecoderOptions};
use iridium_burst_decoder::pretty::pretty;
use iridium_burst_decoder::time::DecoderContext;
use std::io::{self, BufRead};

fn main() {
    iridium_burst_decoder::tracing_init::init_tracing();

    let options = DecoderOptions::default();
    let mut ctx = DecoderContext::default();

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(_) => break,
        };
        if line.trim().is_empty() {
            continue;
        }
        let burst = match parse_line(&line) {
            Ok(b) => b,
            Err(e) => {
                println!("ERR: {e}");
                continue;
            }
        };
        let frame = decode(&mut ctx, burst, &options);
        println!("{}", pretty(&frame, &options));
    }
}
