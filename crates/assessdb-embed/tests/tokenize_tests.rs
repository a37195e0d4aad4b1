use std::str::FromStr;

use assessdb_embed::tokenize_on_device;
use candle_core::Device;
use tokenizers::Tokenizer;

fn word_level() -> Tokenizer {
    Tokenizer::from_str(
        r#"{
            "version": "1.0",
            "truncation": null,
            "padding": null,
            "added_tokens": [],
            "normalizer": null,
            "pre_tokenizer": { "type": "Whitespace" },
            "post_processor": null,
            "decoder": null,
            "model": {
                "type": "WordLevel",
                "vocab": { "<pad>": 1, "<unk>": 3, "python": 10, "developer": 11, "test": 12 },
                "unk_token": "<unk>"
            }
        }"#,
    )
    .expect("tokenizer")
}

#[test]
fn short_text_is_padded_with_pad_id_and_masked() {
    let (ids, mask) = tokenize_on_device(&word_level(), "python developer rust", 5, &Device::Cpu).expect("tokenize");
    assert_eq!(ids.dims(), [1, 5]);
    assert_eq!(ids.to_vec2::<u32>().expect("ids"), vec![vec![10, 11, 3, 1, 1]]);
    assert_eq!(mask.to_vec2::<u32>().expect("mask"), vec![vec![1, 1, 1, 0, 0]]);
}

#[test]
fn long_text_is_truncated_to_max_len() {
    let (ids, mask) = tokenize_on_device(&word_level(), "python developer test python", 2, &Device::Cpu).expect("tokenize");
    assert_eq!(ids.to_vec2::<u32>().expect("ids"), vec![vec![10, 11]]);
    assert_eq!(mask.to_vec2::<u32>().expect("mask"), vec![vec![1, 1]]);
}
