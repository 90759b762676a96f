//! Turns the service's format list into download entries.

use std::time::Duration;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use crate::model::{DownloadLinkEntry, FormatDescriptor, non_empty};
use crate::page::PageView;

/// Characters left alone by query-component encoding
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

/// Delay between the reveal of consecutive entries
pub const STAGGER_STEP: Duration = Duration::from_millis(30);
/// How long a single entry takes to fade in
pub const FADE_IN: Duration = Duration::from_millis(300);

/// Formats a byte count with binary units and one decimal.
/// Returns an empty string for zero, negative or non-numeric input.
pub fn format_bytes(bytes: f64) -> String {
    if !(bytes > 0.0) {
        return String::new();
    }
    let mut value = bytes;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", value, UNITS[unit])
}

fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, COMPONENT).to_string()
}

/// Download endpoint reference for one format of `source_url`
pub fn download_href(source_url: &str, format_id: &str) -> String {
    format!(
        "/download?url={}&format_id={}",
        encode_component(source_url),
        encode_component(format_id)
    )
}

fn entry_label(format: &FormatDescriptor) -> String {
    match non_empty(&format.ext) {
        Some(ext) => format!("{} • {} • {}", format.quality, format.kind, ext),
        None => format!("{} • {}", format.quality, format.kind),
    }
}

fn size_label(format: &FormatDescriptor) -> String {
    match non_empty(&format.size_hint) {
        Some(hint) => hint.to_owned(),
        None => format.filesize.map(format_bytes).unwrap_or_default(),
    }
}

/// Builds one entry per descriptor, in input order
pub fn build_entries(source_url: &str, formats: &[FormatDescriptor]) -> Vec<DownloadLinkEntry> {
    formats
        .iter()
        .map(|format| DownloadLinkEntry {
            href: download_href(source_url, &format.format_id),
            label: entry_label(format),
            size_label: size_label(format),
        })
        .collect()
}

/// When entry `index` starts to appear
pub fn reveal_delay(index: usize) -> Duration {
    STAGGER_STEP * index as u32
}

/// Opacity of entry `index`, `elapsed` after the list was rendered
pub fn reveal_opacity(index: usize, elapsed: Duration) -> f32 {
    let delay = reveal_delay(index);
    if elapsed <= delay {
        return 0.0;
    }
    ((elapsed - delay).as_secs_f32() / FADE_IN.as_secs_f32()).min(1.0)
}

/// True once every entry of a list of `count` is fully shown
pub fn reveal_finished(count: usize, elapsed: Duration) -> bool {
    count == 0 || elapsed >= reveal_delay(count - 1) + FADE_IN
}

/// Writes download entries into the format list of a page
#[derive(Debug, Default, Clone, Copy)]
pub struct FormatRenderer;

impl FormatRenderer {
    /// Replaces whatever the list showed with the entries for `formats`
    pub fn render<V: PageView + ?Sized>(&self, page: &V, source_url: &str, formats: &[FormatDescriptor]) {
        page.replace_formats(build_entries(source_url, formats));
    }

    /// Empties the format list
    pub fn clear<V: PageView + ?Sized>(&self, page: &V) {
        page.replace_formats(Vec::new());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::SharedPage;

    fn format(id: &str) -> FormatDescriptor {
        FormatDescriptor {
            format_id: id.to_string(),
            quality: "720p".to_string(),
            kind: "video".to_string(),
            ext: Some("webm".to_string()),
            size_hint: None,
            filesize: None,
        }
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0.0), "");
        assert_eq!(format_bytes(-5.0), "");
        assert_eq!(format_bytes(f64::NAN), "");
        assert_eq!(format_bytes(500.0), "500.0 B");
        assert_eq!(format_bytes(1023.0), "1023.0 B");
        assert_eq!(format_bytes(1024.0), "1.0 KB");
        assert_eq!(format_bytes(1536.0), "1.5 KB");
        assert_eq!(format_bytes(1048576.0), "1.0 MB");
        assert_eq!(format_bytes(1073741824.0), "1.0 GB");
    }

    #[test]
    fn test_format_bytes_stays_in_largest_unit() {
        let five_tib = 5.0 * 1024f64.powi(4);
        assert_eq!(format_bytes(five_tib), "5120.0 GB");
    }

    #[test]
    fn test_href_encodes_both_parameters() {
        assert_eq!(
            download_href("https://example.com/v", "18"),
            "/download?url=https%3A%2F%2Fexample.com%2Fv&format_id=18"
        );
        assert_eq!(
            download_href("https://x.io/watch?v=a b&t=1", "137+140"),
            "/download?url=https%3A%2F%2Fx.io%2Fwatch%3Fv%3Da%20b%26t%3D1&format_id=137%2B140"
        );
        assert_eq!(download_href("a-b_c.d!~*'()", "x"), "/download?url=a-b_c.d!~*'()&format_id=x");
    }

    #[test]
    fn test_scenario_entry() {
        let formats = vec![FormatDescriptor {
            format_id: "18".to_string(),
            quality: "360p".to_string(),
            kind: "video+audio".to_string(),
            ext: Some("mp4".to_string()),
            size_hint: None,
            filesize: Some(1048576.0),
        }];
        let entries = build_entries("https://example.com/v", &formats);
        assert_eq!(
            entries,
            vec![DownloadLinkEntry {
                href: "/download?url=https%3A%2F%2Fexample.com%2Fv&format_id=18".to_string(),
                label: "360p • video+audio • mp4".to_string(),
                size_label: "1.0 MB".to_string(),
            }]
        );
    }

    #[test]
    fn test_label_omits_missing_ext() {
        let mut f = format("140");
        f.ext = None;
        assert_eq!(entry_label(&f), "720p • video");
        f.ext = Some(String::new());
        assert_eq!(entry_label(&f), "720p • video");
    }

    #[test]
    fn test_size_hint_wins_over_filesize() {
        let mut f = format("1");
        f.size_hint = Some("~1200kbps".to_string());
        f.filesize = Some(2048.0);
        assert_eq!(size_label(&f), "~1200kbps");

        f.size_hint = None;
        assert_eq!(size_label(&f), "2.0 KB");

        f.filesize = Some(0.0);
        assert_eq!(size_label(&f), "");

        f.filesize = None;
        assert_eq!(size_label(&f), "");
    }

    #[test]
    fn test_entries_keep_input_order() {
        let formats: Vec<_> = ["22", "18", "140", "251"].iter().map(|id| format(id)).collect();
        let entries = build_entries("u", &formats);
        let ids: Vec<_> = entries
            .iter()
            .map(|e| e.href.rsplit('=').next().unwrap().to_string())
            .collect();
        assert_eq!(ids, ["22", "18", "140", "251"]);
    }

    #[test]
    fn test_render_is_idempotent() {
        let page = SharedPage::new();
        let formats = vec![format("1"), format("2")];
        let renderer = FormatRenderer;

        renderer.render(&page, "u", &formats);
        let once = page.snapshot().formats;
        renderer.render(&page, "u", &formats);
        assert_eq!(page.snapshot().formats, once);
        assert_eq!(once.len(), 2);
    }

    #[test]
    fn test_render_replaces_previous_list() {
        let page = SharedPage::new();
        let renderer = FormatRenderer;
        renderer.render(&page, "u", &[format("1"), format("2"), format("3")]);
        renderer.render(&page, "v", &[format("9")]);
        let formats = page.snapshot().formats;
        assert_eq!(formats.len(), 1);
        assert!(formats[0].href.starts_with("/download?url=v&"));

        renderer.render(&page, "v", &[]);
        assert!(page.snapshot().formats.is_empty());
    }

    #[test]
    fn test_staggered_reveal() {
        assert_eq!(reveal_delay(0), Duration::ZERO);
        assert_eq!(reveal_delay(3), Duration::from_millis(90));

        assert_eq!(reveal_opacity(2, Duration::from_millis(60)), 0.0);
        assert!((reveal_opacity(0, Duration::from_millis(150)) - 0.5).abs() < 1e-6);
        assert_eq!(reveal_opacity(0, Duration::from_secs(1)), 1.0);
        assert!(reveal_opacity(0, Duration::from_millis(100)) > reveal_opacity(1, Duration::from_millis(100)));

        assert!(reveal_finished(0, Duration::ZERO));
        assert!(!reveal_finished(2, Duration::from_millis(329)));
        assert!(reveal_finished(2, Duration::from_millis(330)));
    }

    #[test]
    fn test_entry_fades_in_steadily_to_full() {
        for idx in 0..4 {
            let mut last = 0.0;
            for ms in (0..=500).step_by(10) {
                let opacity = reveal_opacity(idx, Duration::from_millis(ms));
                assert!((0.0..=1.0).contains(&opacity));
                assert!(opacity >= last, "entry {idx} dimmed at {ms}ms");
                last = opacity;
            }
            assert_eq!(last, 1.0);
        }
    }
}
