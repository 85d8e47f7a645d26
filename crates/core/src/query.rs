//! Query string construction
//!
//! Only options that were actually given are emitted, so the server's own
//! defaults apply to everything else. Keys always come out in the same order.

use crate::options::Options;

/// Ordered query parameters; keys are unique
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams(Vec<(&'static str, String)>);

impl QueryParams {
    /// Build from the common listing options
    pub fn from_options(options: &Options) -> Self {
        Self::build(None, options)
    }

    /// Build for a search request; `query` goes first
    pub fn search(query: &str, options: &Options) -> Self {
        Self::build(Some(query), options)
    }

    fn build(query: Option<&str>, options: &Options) -> Self {
        let candidates = [
            ("query", query.map(str::to_string)),
            ("limit", options.limit.clone()),
            ("page", options.page.clone()),
            ("fields", options.fields.clone()),
            ("order_by", options.order_by.clone()),
            ("order_dir", options.order_dir.clone()),
            ("type", options.item_type.clone()),
            ("cursor", options.cursor.clone()),
        ];

        Self(
            candidates
                .into_iter()
                .filter_map(|(key, value)| value.map(|v| (key, v)))
                .collect(),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Key/value pairs in emission order
    pub fn pairs(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.0.iter().map(|(k, v)| (*k, v.as_str()))
    }

    pub fn keys(&self) -> Vec<&'static str> {
        self.0.iter().map(|(k, _)| *k).collect()
    }

    /// Percent-encoded `k=v&k=v` form
    pub fn to_query_string(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.pairs())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_options_are_omitted() {
        let query = QueryParams::from_options(&Options::default());
        assert!(query.is_empty());
        assert_eq!(query.to_query_string(), "");
    }

    #[test]
    fn test_subset_emits_exactly_those_keys() {
        let options = Options {
            page: Some("2".into()),
            order_dir: Some("DESC".into()),
            ..Default::default()
        };
        let query = QueryParams::from_options(&options);
        assert_eq!(query.keys(), vec!["page", "order_dir"]);
        assert_eq!(query.get("page"), Some("2"));
    }

    #[test]
    fn test_fixed_order_regardless_of_input() {
        let options = Options {
            item_type: Some("note".into()),
            fields: Some("id,title".into()),
            limit: Some("10".into()),
            order_by: Some("updated_time".into()),
            ..Default::default()
        };
        let query = QueryParams::from_options(&options);
        assert_eq!(query.keys(), vec!["limit", "fields", "order_by", "type"]);
        assert_eq!(
            query.to_query_string(),
            "limit=10&fields=id%2Ctitle&order_by=updated_time&type=note"
        );
    }

    #[test]
    fn test_search_puts_query_first() {
        let options = Options {
            limit: Some("5".into()),
            ..Default::default()
        };
        let query = QueryParams::search("rust async", &options);
        assert_eq!(query.keys(), vec!["query", "limit"]);
        assert_eq!(query.to_query_string(), "query=rust+async&limit=5");
    }
}
