use std::backtrace::Backtrace;

/// Symbol prefixes of frames that belong to the capture machinery or to this
/// crate's own event handling. They never show up in a rendered trace.
const INTERNAL_FRAMES: &[&str] = &[
    "std::backtrace::",
    "std::backtrace_rs::",
    concat!(env!("CARGO_CRATE_NAME"), "::trace::"),
    concat!(env!("CARGO_CRATE_NAME"), "::writer::"),
    concat!(env!("CARGO_CRATE_NAME"), "::layer::"),
    concat!(env!("CARGO_CRATE_NAME"), "::panic::"),
];

/// One resolved stack frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub symbol: String,
    pub location: Option<String>,
}

impl Frame {
    /// `symbol (file:line:col)`, or just the symbol.
    pub fn render(&self) -> String {
        match &self.location {
            Some(location) => format!("{} ({})", self.symbol, location),
            None => self.symbol.clone(),
        }
    }

    fn is_internal(&self) -> bool {
        INTERNAL_FRAMES.iter().any(|prefix| self.symbol.contains(prefix))
    }
}

/// Capture the current call stack as rendered frame lines, innermost first,
/// with this crate's own frames removed.
///
/// Capture is forced regardless of `RUST_BACKTRACE`. On platforms without
/// backtrace support the result is empty.
pub fn capture_frames() -> Vec<String> {
    let backtrace = Backtrace::force_capture();
    parse_frames(&backtrace.to_string())
        .into_iter()
        .filter(|frame| !frame.is_internal())
        .map(|frame| frame.render())
        .collect()
}

/// Parse the display form of a `std::backtrace::Backtrace`:
///
/// ```text
///    0: my_app::handler
///              at ./src/main.rs:10:5
///    1: <unknown>
/// ```
pub fn parse_frames(rendered: &str) -> Vec<Frame> {
    let mut frames: Vec<Frame> = Vec::new();
    for line in rendered.lines() {
        let line = line.trim();
        if let Some(location) = line.strip_prefix("at ") {
            if let Some(frame) = frames.last_mut() {
                if frame.location.is_none() {
                    frame.location = Some(location.to_string());
                }
            }
            continue;
        }

        let Some((index, symbol)) = line.split_once(": ") else {
            continue;
        };
        if !index.is_empty() && index.chars().all(|c| c.is_ascii_digit()) {
            frames.push(Frame {
                symbol: symbol.trim().to_string(),
                location: None,
            });
        }
    }
    frames
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "   0: std::backtrace_rs::backtrace::libunwind::trace
             at /rustc/abc/library/std/src/../../backtrace/src/backtrace/libunwind.rs:116:5
   1: std::backtrace::Backtrace::create
             at /rustc/abc/library/std/src/backtrace.rs:331:13
   2: tracing_gec_sink::writer::ErrorRecordWriter::on_event
             at ./src/writer.rs:120:9
   3: billing::charge_card
             at ./src/billing.rs:42:5
   4: <unknown>
";

    #[test]
    fn parses_symbols_and_locations() {
        let frames = parse_frames(SAMPLE);
        assert_eq!(frames.len(), 5);
        assert_eq!(frames[3].symbol, "billing::charge_card");
        assert_eq!(frames[3].location.as_deref(), Some("./src/billing.rs:42:5"));
        assert_eq!(frames[4].symbol, "<unknown>");
        assert_eq!(frames[4].location, None);
    }

    #[test]
    fn internal_frames_are_recognized() {
        let frames = parse_frames(SAMPLE);
        let kept: Vec<String> = frames
            .iter()
            .filter(|f| !f.is_internal())
            .map(Frame::render)
            .collect();
        assert_eq!(
            kept,
            vec![
                "billing::charge_card (./src/billing.rs:42:5)".to_string(),
                "<unknown>".to_string(),
            ]
        );
    }

    #[test]
    fn ignores_unrelated_lines() {
        assert!(parse_frames("unsupported backtrace").is_empty());
        assert!(parse_frames("disabled backtrace").is_empty());
        assert!(parse_frames("").is_empty());
    }
}
