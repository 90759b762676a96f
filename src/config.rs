use clap::Parser;
use url::Url;

/// Where the metadata service listens unless told otherwise
pub const DEFAULT_SERVER: &str = "http://127.0.0.1:5050/";

/// Look up download options for a media link
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Base URL of the metadata and download service
    #[arg(long, env = "FETCHER_SERVER", default_value = DEFAULT_SERVER, value_parser = parse_server)]
    pub server: Url,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Log filter directive, e.g. `media_link_fetcher=trace`
    #[arg(long, env = "RUST_LOG")]
    pub log: Option<String>,
}

/// Parses a service base URL, normalized to end with `/` so relative
/// endpoints resolve beneath it.
pub fn parse_server(value: &str) -> Result<Url, String> {
    let mut url = Url::parse(value.trim()).map_err(|e| format!("invalid server URL: {e}"))?;
    if url.cannot_be_a_base() {
        return Err(format!("{value} cannot be used as a base URL"));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

impl Args {
    pub fn log_filter(&self) -> String {
        match (&self.log, self.verbose) {
            (Some(filter), _) => filter.clone(),
            (None, true) => "media_link_fetcher=debug,info".to_string(),
            (None, false) => "info".to_string(),
        }
    }

    /// Turns a link from the page (e.g. `/download?...`) into an absolute URL
    pub fn resolve(&self, link: &str) -> Result<Url, url::ParseError> {
        let relative = link
            .strip_prefix('/')
            .filter(|rest| !rest.starts_with('/'))
            .unwrap_or(link);
        self.server.join(relative)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        let mut full = vec!["media-link-fetcher"];
        full.extend_from_slice(args);
        Args::try_parse_from(full).unwrap()
    }

    #[test]
    fn test_server_gets_trailing_slash() {
        let args = parse(&["--server", "https://media.example/fetcher"]);
        assert_eq!(args.server.as_str(), "https://media.example/fetcher/");

        let args = parse(&["--server", "http://localhost:8000"]);
        assert_eq!(args.server.as_str(), "http://localhost:8000/");
    }

    #[test]
    fn test_rejects_non_base_server() {
        assert!(parse_server("not a url").is_err());
        assert!(parse_server("mailto:someone@example.com").is_err());
    }

    #[test]
    fn test_log_filter_precedence() {
        let args = parse(&["--server", DEFAULT_SERVER]);
        let quiet = Args { log: None, ..args.clone() };
        assert_eq!(quiet.log_filter(), "info");

        let verbose = Args { verbose: true, log: None, ..args.clone() };
        assert_eq!(verbose.log_filter(), "media_link_fetcher=debug,info");

        let explicit = Args { verbose: true, log: Some("warn".to_string()), ..args };
        assert_eq!(explicit.log_filter(), "warn");
    }

    #[test]
    fn test_resolve_download_link() {
        let args = parse(&["--server", "https://media.example/fetcher"]);
        let link = args.resolve("/download?url=https%3A%2F%2Fexample.com%2Fv&format_id=18").unwrap();
        assert_eq!(
            link.as_str(),
            "https://media.example/fetcher/download?url=https%3A%2F%2Fexample.com%2Fv&format_id=18"
        );

        let thumb = args.resolve("https://img.example/t.jpg").unwrap();
        assert_eq!(thumb.as_str(), "https://img.example/t.jpg");

        let relative = args.resolve("t.jpg").unwrap();
        assert_eq!(relative.as_str(), "https://media.example/fetcher/t.jpg");
    }
}
