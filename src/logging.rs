use env_logger::Builder;
use log::LevelFilter;

/// Console logging. `RUST_LOG` wins when set; otherwise this crate logs at info and
/// every other crate only at warn.
pub fn setup_logger() {
    let mut builder = Builder::new();
    if std::env::var("RUST_LOG").is_ok() {
        builder.parse_env("RUST_LOG");
    } else {
        builder.filter(None, LevelFilter::Warn);
        builder.filter(Some("detection_annotator"), LevelFilter::Info);
    }
    builder.format_timestamp_millis();
    builder.init();
}
