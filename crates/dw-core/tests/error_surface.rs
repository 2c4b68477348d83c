use dw_core::errors::{DwError, ErrorInfo};

fn sample_info(code: &str, message: &str) -> ErrorInfo {
    ErrorInfo::new(code, message)
        .with_context("path", "/records/Scene_iters(1,0)")
        .with_context("found", "12")
}

#[test]
fn insufficient_frames_surface() {
    let err = DwError::InsufficientFrames(sample_info("cache-frames", "too few frames"));
    assert_eq!(err.info().code, "cache-frames");
    assert!(err.info().context.contains_key("found"));
}

#[test]
fn display_lists_context_and_hint() {
    let err = DwError::FrameRead(sample_info("frame-decode", "decode failed").with_hint("retry later"));
    let text = err.to_string();
    assert!(text.starts_with("frame read error: decode failed (code: frame-decode)"));
    assert!(text.contains("found=12"));
    assert!(text.ends_with("hint: retry later"));
}

#[test]
fn errors_serialize_with_family_tag() {
    let err = DwError::Parse(sample_info("codec-scene", "bad prefix"));
    let json = serde_json::to_value(&err).unwrap();
    assert_eq!(json["family"], "Parse");
    assert_eq!(json["detail"]["code"], "codec-scene");
    let back: DwError = serde_json::from_value(json).unwrap();
    assert_eq!(back, err);
}

#[test]
fn io_helper_records_path() {
    let err = DwError::io("write", std::path::Path::new("/tmp/x"), "denied");
    assert_eq!(err.info().context.get("path").map(String::as_str), Some("/tmp/x"));
    assert_eq!(err.info().hint.as_deref(), Some("denied"));
}
