/// URL conversion between original sites and their EDS mirrors
///
/// Algorithm:
/// 1. Parse the URL and lowercase its hostname
/// 2. Classify the hostname as EDS (published) or original
/// 3. Pick the target domain from the mapping snapshot:
///    - EDS → original: the single mapped domain
///    - original → EDS: the best of the candidate list (live, then page, then first)
/// 4. Adjust the path extension for the direction of travel
/// 5. Rebuild as `https://{target}{path}{query}{fragment}`
///
/// Examples (with `example.com` mapped to `example-site.aem.live,example-site.aem.page`):
/// - https://example.com/about.html → https://example-site.aem.live/about
/// - https://example-site.aem.live/about → https://example.com/about.html
use url::Url;

use crate::config::{DEFAULT_EXTENSION, LIVE_MARKER, PAGE_MARKER};
use crate::domain::{Family, has_extension, strip_known_extension};
use crate::error::SwitchError;
use crate::mapping::Mapping;
use crate::storage::{KeyValueStore, MappingStore};

/// A conversion whose target is decided but whose path may still need
/// an extension preference from storage
#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    source_domain: String,
    target_domain: String,
    from: Family,
    to: Family,
    path: String,
    query: String,
    fragment: String,
}

impl Conversion {
    pub fn plan(source_url: &str, mapping: &Mapping) -> Result<Conversion, SwitchError> {
        let url = Url::parse(source_url).map_err(|e| {
            log::error!("Error converting URL {}: {}", source_url, e);
            SwitchError::unparseable(source_url, e)
        })?;

        let source_domain = url.host_str().unwrap_or_default().to_lowercase();
        let from = Family::of(&source_domain);

        let target_domain = match from {
            // EDS keys hold a single original domain
            Family::Published => mapping.candidates(&source_domain).first().copied(),
            Family::Original => select_published_target(&mapping.candidates(&source_domain)),
        }
        .map(str::to_string)
        .ok_or_else(|| SwitchError::NoMappingConfigured {
            domain: source_domain.clone(),
        })?;

        let to = Family::of(&target_domain);

        let path = match (from, to) {
            (Family::Original, Family::Published) => strip_known_extension(url.path()).to_string(),
            _ => url.path().to_string(),
        };

        // Browsers drop a bare `?` or `#`, so do we
        let query = url
            .query()
            .filter(|q| !q.is_empty())
            .map(|q| format!("?{}", q))
            .unwrap_or_default();
        let fragment = url
            .fragment()
            .filter(|f| !f.is_empty())
            .map(|f| format!("#{}", f))
            .unwrap_or_default();

        Ok(Conversion {
            source_domain,
            target_domain,
            from,
            to,
            path,
            query,
            fragment,
        })
    }

    pub fn source_domain(&self) -> &str {
        &self.source_domain
    }

    pub fn target_domain(&self) -> &str {
        &self.target_domain
    }

    /// The `(source, target)` pair whose extension preference decides the
    /// final path, or `None` when the path is already final.
    pub fn preference_lookup(&self) -> Option<(&str, &str)> {
        self.needs_extension()
            .then(|| (self.source_domain.as_str(), self.target_domain.as_str()))
    }

    fn needs_extension(&self) -> bool {
        self.from == Family::Published
            && self.to == Family::Original
            && !has_extension(&self.path)
            && !self.path.ends_with('/')
    }

    /// Assemble the target URL. `preference` is the stored extension for this
    /// direction (possibly empty); `None` means use the default.
    pub fn finish(self, preference: Option<&str>) -> String {
        let needs_extension = self.needs_extension();
        let mut path = self.path;
        if needs_extension {
            path.push_str(preference.unwrap_or(DEFAULT_EXTENSION));
        }

        format!(
            "https://{}{}{}{}",
            self.target_domain, path, self.query, self.fragment
        )
    }
}

/// Pick one EDS target from an ordered candidate list.
/// Prefers live (production), then page (staging), then the first entry.
pub fn select_published_target<'a>(candidates: &[&'a str]) -> Option<&'a str> {
    match candidates {
        [] => None,
        [only] => Some(*only),
        _ => {
            let chosen = candidates
                .iter()
                .find(|c| c.contains(LIVE_MARKER))
                .or_else(|| candidates.iter().find(|c| c.contains(PAGE_MARKER)))
                .or_else(|| candidates.first())
                .copied();
            log::debug!("Selected {:?} from targets {:?}", chosen, candidates);
            chosen
        }
    }
}

/// Convert a URL to its counterpart using a mapping snapshot, reading the
/// extension preference from `store` only when the path needs one.
pub async fn convert<S: KeyValueStore>(
    source_url: &str,
    mapping: &Mapping,
    store: &MappingStore<S>,
) -> Result<String, SwitchError> {
    let conversion = Conversion::plan(source_url, mapping)?;

    let preference = match conversion.preference_lookup() {
        Some((source, target)) => store.extension_preference(source, target).await,
        None => None,
    };

    Ok(conversion.finish(preference.as_deref()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RECOGNIZED_EXTENSIONS;
    use crate::storage::MemoryStore;
    use pollster::block_on;
    use serde_json::json;

    fn example_mapping() -> Mapping {
        let mut mapping = Mapping::new();
        mapping.link(
            "example.com",
            &[
                "example-site.aem.live".to_string(),
                "example-site.aem.page".to_string(),
            ],
        );
        mapping
    }

    fn convert_with(url: &str, mapping: &Mapping, store: MemoryStore) -> Result<String, SwitchError> {
        block_on(convert(url, mapping, &MappingStore::new(store)))
    }

    #[test]
    fn test_original_to_live_strips_extension() {
        let mut mapping = Mapping::new();
        mapping.insert("example.com", "example-site.aem.live,example-site.aem.page");

        let result = convert_with("https://example.com/about.html", &mapping, MemoryStore::default());

        assert_eq!(result.unwrap(), "https://example-site.aem.live/about");
    }

    #[test]
    fn test_published_to_original_uses_stored_extension() {
        let mut mapping = Mapping::new();
        mapping.insert("example-site.aem.live", "example.com");
        let store = MemoryStore::with(json!({ "example-site.aem.live->example.com-extension": ".php" }));

        let result = convert_with("https://example-site.aem.live/contact", &mapping, store);

        assert_eq!(result.unwrap(), "https://example.com/contact.php");
    }

    #[test]
    fn test_published_to_original_empty_preference_appends_nothing() {
        let mut mapping = Mapping::new();
        mapping.insert("example-site.aem.live", "example.com");
        let store = MemoryStore::with(json!({ "example-site.aem.live->example.com-extension": "" }));

        let result = convert_with("https://example-site.aem.live/contact", &mapping, store);

        assert_eq!(result.unwrap(), "https://example.com/contact");
    }

    #[test]
    fn test_published_to_original_defaults_to_html() {
        let result = convert_with(
            "https://example-site.aem.page/news/latest",
            &example_mapping(),
            MemoryStore::default(),
        );

        assert_eq!(result.unwrap(), "https://example.com/news/latest.html");
    }

    #[test]
    fn test_preference_read_failure_falls_back_to_default() {
        let store = MemoryStore::with(json!({ "example-site.aem.live->example.com-extension": ".php" }));
        store.fail_reads.set(true);

        let result = convert_with("https://example-site.aem.live/contact", &example_mapping(), store);

        assert_eq!(result.unwrap(), "https://example.com/contact.html");
    }

    #[test]
    fn test_unknown_domain_has_no_mapping() {
        let result = convert_with("https://unknown.com/x", &example_mapping(), MemoryStore::default());

        match result {
            Err(SwitchError::NoMappingConfigured { domain }) => assert_eq!(domain, "unknown.com"),
            other => panic!("expected no mapping, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_published_domain_has_no_mapping() {
        let result = convert_with("https://other.aem.live/x", &example_mapping(), MemoryStore::default());
        assert!(matches!(result, Err(SwitchError::NoMappingConfigured { .. })));
    }

    #[test]
    fn test_unparseable_url() {
        let result = convert_with("not a url", &example_mapping(), MemoryStore::default());
        assert!(matches!(result, Err(SwitchError::UnparseableUrl { .. })));
    }

    #[test]
    fn test_trailing_slash_left_alone() {
        let mut mapping = Mapping::new();
        mapping.insert("example-site.aem.live", "example.com");
        let store = MemoryStore::with(json!({ "example-site.aem.live->example.com-extension": ".php" }));

        let result = convert_with("https://example-site.aem.live/", &mapping, store);

        assert_eq!(result.unwrap(), "https://example.com/");
    }

    #[test]
    fn test_existing_extension_left_alone() {
        let result = convert_with(
            "https://example-site.aem.live/media/logo.png",
            &example_mapping(),
            MemoryStore::default(),
        );

        assert_eq!(result.unwrap(), "https://example.com/media/logo.png");
    }

    #[test]
    fn test_unrecognized_extension_kept_going_to_eds() {
        let result = convert_with(
            "https://example.com/files/report.pdf",
            &example_mapping(),
            MemoryStore::default(),
        );

        assert_eq!(result.unwrap(), "https://example-site.aem.live/files/report.pdf");
    }

    #[test]
    fn test_every_recognized_extension_is_stripped() {
        for ext in RECOGNIZED_EXTENSIONS {
            let url = format!("https://example.com/section/page{}", ext);
            let result = convert_with(&url, &example_mapping(), MemoryStore::default());
            assert_eq!(result.unwrap(), "https://example-site.aem.live/section/page");
        }
    }

    #[test]
    fn test_query_and_fragment_preserved() {
        let result = convert_with(
            "https://example.com/search.html?q=rust&page=2#results",
            &example_mapping(),
            MemoryStore::default(),
        );
        assert_eq!(
            result.unwrap(),
            "https://example-site.aem.live/search?q=rust&page=2#results"
        );

        let back = convert_with(
            "https://example-site.aem.live/search?q=rust#results",
            &example_mapping(),
            MemoryStore::default(),
        );
        assert_eq!(back.unwrap(), "https://example.com/search.html?q=rust#results");
    }

    #[test]
    fn test_empty_query_and_fragment_dropped() {
        let result = convert_with("https://example.com/about.html?#", &example_mapping(), MemoryStore::default());
        assert_eq!(result.unwrap(), "https://example-site.aem.live/about");
    }

    #[test]
    fn test_scheme_forced_to_https() {
        let result = convert_with("http://example.com/about.html", &example_mapping(), MemoryStore::default());
        assert_eq!(result.unwrap(), "https://example-site.aem.live/about");
    }

    #[test]
    fn test_round_trip_with_default_extension() {
        let original = "https://example.com/docs/about.html?x=1#top";

        let published = convert_with(original, &example_mapping(), MemoryStore::default()).unwrap();
        let back = convert_with(&published, &example_mapping(), MemoryStore::default()).unwrap();

        assert_eq!(published, "https://example-site.aem.live/docs/about?x=1#top");
        assert_eq!(back, original);
    }

    #[test]
    fn test_same_family_passes_path_through() {
        let mut mapping = Mapping::new();
        mapping.insert("old.example.com", "new.example.com");
        mapping.insert("site.aem.page", "site.aem.live");

        let original = convert_with("https://old.example.com/a.html", &mapping, MemoryStore::default());
        let published = convert_with("https://site.aem.page/a", &mapping, MemoryStore::default());

        assert_eq!(original.unwrap(), "https://new.example.com/a.html");
        assert_eq!(published.unwrap(), "https://site.aem.live/a");
    }

    #[test]
    fn test_published_key_with_list_uses_first_entry() {
        let mut mapping = Mapping::new();
        mapping.insert("site.aem.live", " example.com , other.com");

        let result = convert_with("https://site.aem.live/x.html", &mapping, MemoryStore::default());

        assert_eq!(result.unwrap(), "https://example.com/x.html");
    }

    #[test]
    fn test_hostname_is_matched_lowercase() {
        let result = convert_with("https://EXAMPLE.com/About.HTML", &example_mapping(), MemoryStore::default());
        assert_eq!(result.unwrap(), "https://example-site.aem.live/About");
    }

    #[test]
    fn test_select_prefers_live_regardless_of_order() {
        let orders = [
            vec!["a.aem.page", "a.aem.live", "a.example.net"],
            vec!["a.example.net", "a.aem.page", "a.aem.live"],
            vec!["a.aem.live", "a.aem.page"],
        ];
        for candidates in orders {
            assert_eq!(select_published_target(&candidates), Some("a.aem.live"));
        }
    }

    #[test]
    fn test_select_falls_back_to_page_then_first() {
        assert_eq!(
            select_published_target(&["a.example.net", "a.aem.page"]),
            Some("a.aem.page")
        );
        assert_eq!(
            select_published_target(&["first.example.net", "second.example.net"]),
            Some("first.example.net")
        );
        assert_eq!(select_published_target(&["only.example.net"]), Some("only.example.net"));
        assert_eq!(select_published_target(&[]), None);
    }

    #[test]
    fn test_plan_reports_preference_lookup() {
        let mapping = example_mapping();

        let back = Conversion::plan("https://example-site.aem.live/contact", &mapping).unwrap();
        assert_eq!(back.preference_lookup(), Some(("example-site.aem.live", "example.com")));
        assert_eq!(back.finish(Some(".aspx")), "https://example.com/contact.aspx");

        let forward = Conversion::plan("https://example.com/contact.php", &mapping).unwrap();
        assert_eq!(forward.source_domain(), "example.com");
        assert_eq!(forward.target_domain(), "example-site.aem.live");
        assert_eq!(forward.preference_lookup(), None);
        // A preference never applies going to EDS
        assert_eq!(forward.finish(Some(".aspx")), "https://example-site.aem.live/contact");
    }
}
