use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationDecision {
    StayInWebView,
    OpenExternally(Url),
}

fn is_web(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https")
}

/// Bundled files and non-web schemes stay in the webview; web links open in
/// the system browser. Unparseable targets are left to the webview.
pub fn decide(raw: &str) -> NavigationDecision {
    match Url::parse(raw) {
        Ok(url) if is_web(&url) => NavigationDecision::OpenExternally(url),
        Ok(_) | Err(_) => NavigationDecision::StayInWebView,
    }
}

/// Pop-ups never get an in-app window. Web targets open externally and
/// everything else is ignored.
pub fn decide_popup(raw: &str) -> Option<Url> {
    Url::parse(raw).ok().filter(is_web)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_files_stay_inside() {
        assert_eq!(
            decide("file:///app/web/index.html#/reminders"),
            NavigationDecision::StayInWebView
        );
        assert_eq!(decide("about:blank"), NavigationDecision::StayInWebView);
        assert_eq!(decide("mailto:clerk@example.gov"), NavigationDecision::StayInWebView);
        assert_eq!(decide("not a url"), NavigationDecision::StayInWebView);
    }

    #[test]
    fn web_links_open_externally() {
        let NavigationDecision::OpenExternally(url) = decide("https://vote.gov/register") else {
            panic!("expected external navigation");
        };
        assert_eq!(url.host_str(), Some("vote.gov"));
        assert!(matches!(
            decide("http://example.org"),
            NavigationDecision::OpenExternally(_)
        ));
    }

    #[test]
    fn popups_only_open_web_targets() {
        assert!(decide_popup("https://vote.gov").is_some());
        assert!(decide_popup("file:///app/web/terms.html").is_none());
        assert!(decide_popup("javascript:void(0)").is_none());
    }
}
