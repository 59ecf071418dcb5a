use std::sync::Mutex;

use tempfile::NamedTempFile;

use detection_overlay::config::OverlayConfig;
use detection_overlay::Color;

static ENV_LOCK: Mutex<()> = Mutex::new(());

fn clear_env() {
    for key in [
        "OVERLAY_CONFIG",
        "OVERLAY_DPR",
        "OVERLAY_FONT_PATH",
        "OVERLAY_MIN_SCORE",
        "OVERLAY_MAX_DETECTIONS",
    ] {
        std::env::remove_var(key);
    }
}

fn write_config(json: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp config");
    std::io::Write::write_all(&mut file, json.as_bytes()).expect("write config");
    file
}

#[test]
fn defaults_without_config_file() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let cfg = OverlayConfig::load().expect("load config");
    assert_eq!(cfg.device_pixel_ratio, 1.0);
    assert_eq!(cfg.filter.max_detections, 20);
    assert_eq!(cfg.filter.min_score, 0.5);
    assert!(cfg.font_path.is_none());

    let style = cfg.overlay_style().expect("style");
    assert_eq!(style.line_width, 2.0);
    assert_eq!(style.font.size_px, 16.0);
    assert_eq!(style.label_height, 18.0);
    assert_eq!(style.label_padding, 8.0);
    assert_eq!(style.box_color, Color::BLACK);
    assert_eq!(style.label_text, Color::WHITE);
}

#[test]
fn loads_config_from_file_and_env_overrides() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let file = write_config(
        r##"{
            "device_pixel_ratio": 2.0,
            "font_path": "/usr/share/fonts/label.ttf",
            "style": {
                "line_width": 3,
                "font_px": 14,
                "label_height": 20,
                "box_color": "#00ff00",
                "label_background": "#00000080"
            },
            "filter": {
                "max_detections": 5,
                "min_score": 0.3
            },
            "preview": {
                "background": "#202020"
            }
        }"##,
    );

    std::env::set_var("OVERLAY_CONFIG", file.path());
    std::env::set_var("OVERLAY_DPR", "3");
    std::env::set_var("OVERLAY_MIN_SCORE", "0.65");

    let cfg = OverlayConfig::load().expect("load config");

    assert_eq!(cfg.device_pixel_ratio, 3.0);
    assert_eq!(cfg.device_pixel_ratio().get(), 3.0);
    assert_eq!(
        cfg.font_path.as_deref(),
        Some(std::path::Path::new("/usr/share/fonts/label.ttf"))
    );
    assert_eq!(cfg.filter.max_detections, 5);
    assert_eq!(cfg.filter.min_score, 0.65);
    assert_eq!(cfg.preview_background().unwrap(), Color::rgb(32, 32, 32));

    let style = cfg.overlay_style().expect("style");
    assert_eq!(style.line_width, 3.0);
    assert_eq!(style.font.size_px, 14.0);
    assert_eq!(style.label_height, 20.0);
    assert_eq!(style.box_color, Color::rgb(0, 255, 0));
    assert_eq!(style.label_background.a, 128);
    assert_eq!(style.label_text, Color::WHITE);

    clear_env();
}

#[test]
fn rejects_invalid_values() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    std::env::set_var("OVERLAY_MIN_SCORE", "1.5");
    let err = OverlayConfig::load().unwrap_err();
    assert!(err.to_string().contains("min_score"));
    clear_env();

    std::env::set_var("OVERLAY_DPR", "fast");
    assert!(OverlayConfig::load().is_err());
    clear_env();

    let file = write_config(r#"{"style": {"box_color": "green"}}"#);
    std::env::set_var("OVERLAY_CONFIG", file.path());
    let err = OverlayConfig::load().unwrap_err();
    assert!(err.to_string().contains("style.box_color"));
    clear_env();

    let file = write_config(r#"{"filter": {"max_detections": 0}}"#);
    std::env::set_var("OVERLAY_CONFIG", file.path());
    assert!(OverlayConfig::load().is_err());
    clear_env();
}
