//! The page location and its `username` parameter.

use url::{form_urlencoded, Url};

pub const USERNAME_PARAM: &str = "username";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressBar {
    url: Url,
}

impl AddressBar {
    pub fn new(url: Url) -> Self {
        Self { url }
    }

    pub fn parse(raw: &str) -> Result<Self, url::ParseError> {
        Url::parse(raw).map(Self::new)
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Opaque origins (`about:`, `data:`, ...) cannot rewrite their query.
    pub fn history_available(&self) -> bool {
        self.url.origin().is_tuple()
    }

    /// Query string first, then `#name=value` fragment pairs.
    pub fn param(&self, name: &str) -> Option<String> {
        self.url
            .query_pairs()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
            .or_else(|| {
                let fragment = self.url.fragment()?;
                form_urlencoded::parse(fragment.as_bytes())
                    .find(|(key, _)| key == name)
                    .map(|(_, value)| value.into_owned())
            })
    }

    pub fn set_param(&mut self, name: &str, value: &str) {
        self.rewrite(name, Some(value));
    }

    pub fn remove_param(&mut self, name: &str) {
        self.rewrite(name, None);
    }

    /// Origin and path of the page with only `?username=<username>`.
    pub fn share_url(&self, username: &str) -> String {
        let mut share = self.url.clone();
        share.set_fragment(None);
        share.set_query(None);
        share.query_pairs_mut().append_pair(USERNAME_PARAM, username);
        share.to_string()
    }

    fn rewrite(&mut self, name: &str, value: Option<&str>) {
        if self.history_available() {
            let pairs = replace_pair(self.url.query().unwrap_or(""), name, value);
            self.url.set_query(pairs.as_deref());
        } else {
            let pairs = replace_pair(self.url.fragment().unwrap_or(""), name, value);
            self.url.set_fragment(pairs.as_deref());
        }
    }
}

/// Re-encodes `raw` with `name` replaced (or dropped); `None` when empty.
fn replace_pair(raw: &str, name: &str, value: Option<&str>) -> Option<String> {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    let mut count = 0;
    for (key, existing) in form_urlencoded::parse(raw.as_bytes()) {
        if key != name {
            serializer.append_pair(&key, &existing);
            count += 1;
        }
    }
    if let Some(value) = value {
        serializer.append_pair(name, value);
        count += 1;
    }
    (count > 0).then(|| serializer.finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_query_before_fragment() {
        let bar = AddressBar::parse("http://localhost/index.html?username=torvalds#username=x").unwrap();
        assert_eq!(bar.param(USERNAME_PARAM).as_deref(), Some("torvalds"));

        let bar = AddressBar::parse("http://localhost/index.html#username=octocat").unwrap();
        assert_eq!(bar.param(USERNAME_PARAM).as_deref(), Some("octocat"));

        let bar = AddressBar::parse("http://localhost/index.html").unwrap();
        assert_eq!(bar.param(USERNAME_PARAM), None);
    }

    #[test]
    fn set_and_remove_keep_other_params() {
        let mut bar = AddressBar::parse("http://localhost/index.html?tab=repos").unwrap();
        bar.set_param(USERNAME_PARAM, "gaearon");
        assert_eq!(
            bar.url().as_str(),
            "http://localhost/index.html?tab=repos&username=gaearon"
        );
        bar.set_param(USERNAME_PARAM, "a b");
        assert_eq!(bar.param(USERNAME_PARAM).as_deref(), Some("a b"));

        bar.remove_param(USERNAME_PARAM);
        assert_eq!(bar.url().as_str(), "http://localhost/index.html?tab=repos");
        bar.remove_param("tab");
        assert_eq!(bar.url().as_str(), "http://localhost/index.html");
    }

    #[test]
    fn opaque_origin_falls_back_to_fragment() {
        let mut bar = AddressBar::parse("about:blank").unwrap();
        assert!(!bar.history_available());
        bar.set_param(USERNAME_PARAM, "octocat");
        assert_eq!(bar.url().as_str(), "about:blank#username=octocat");
        assert_eq!(bar.param(USERNAME_PARAM).as_deref(), Some("octocat"));
        bar.remove_param(USERNAME_PARAM);
        assert_eq!(bar.url().as_str(), "about:blank");
    }

    #[test]
    fn share_url_drops_other_state() {
        let bar = AddressBar::parse("https://example.com/app/index.html?x=1#top").unwrap();
        assert_eq!(
            bar.share_url("Rich-Harris"),
            "https://example.com/app/index.html?username=Rich-Harris"
        );
    }
}
