#![no_main]

use libfuzzer_sys::fuzz_target;
use sourpea::balance::Block;
use sourpea::design::Factor;
use sourpea::sequence::parse_sequence;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        if let Ok(sequence) = parse_sequence(input) {
            let word = Factor::new("word", ["red", "green"]).unwrap();
            let color = Factor::new("color", ["red", "green"]).unwrap();
            let block = Block::crossed(vec![word, color]).unwrap();
            let _ = block.test(&sequence);
        }
    }
});
