use ctg_core::{RawMatch, Result, SearchBackend, SearchQuery};

/// Matches of one page plus whether another page may follow.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub matches: Vec<RawMatch>,
    pub has_more: bool,
}

/// Walks the search endpoint's continuation-token protocol.
///
/// The token from page N is only ever sent with the request for page N+1,
/// and there is no way to set it from outside, so pages are requested
/// strictly in order. Once a page reports `has_more == false` the cursor is
/// exhausted and further calls return an empty page without a request.
pub struct PageCursor<'a> {
    backend: &'a dyn SearchBackend,
    query: SearchQuery,
    exhausted: bool,
    pages_fetched: usize,
}

impl<'a> PageCursor<'a> {
    pub fn new(backend: &'a dyn SearchBackend, term: Option<String>, page_size: usize) -> Self {
        Self {
            backend,
            query: SearchQuery::new(term, page_size),
            exhausted: false,
            pages_fetched: 0,
        }
    }

    pub async fn next_page(&mut self) -> Result<Page> {
        if self.exhausted {
            return Ok(Page {
                matches: Vec::new(),
                has_more: false,
            });
        }

        let page = self.backend.search(&self.query).await?;
        self.pages_fetched += 1;

        let has_more = !page.matches.is_empty() && page.next_page_token.is_some();
        self.query.page_token = page.next_page_token;
        self.exhausted = !has_more;

        Ok(Page {
            matches: page.matches,
            has_more,
        })
    }

    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{page, ScriptedSearch};
    use ctg_core::Error;

    #[tokio::test]
    async fn test_tokens_are_chained() {
        let backend = ScriptedSearch::new(vec![
            page(&["NCT1", "NCT2"], Some("t1")),
            page(&["NCT3", "NCT4"], Some("t2")),
            page(&["NCT5"], None),
        ]);
        let mut cursor = PageCursor::new(&backend, Some("term".to_string()), 2);

        let first = cursor.next_page().await.unwrap();
        assert!(first.has_more);
        let second = cursor.next_page().await.unwrap();
        assert!(second.has_more);
        let third = cursor.next_page().await.unwrap();
        assert!(!third.has_more);
        assert_eq!(third.matches[0].id, "NCT5");

        let queries = backend.queries();
        assert_eq!(queries.len(), 3);
        assert_eq!(queries[0].page_token, None);
        assert_eq!(queries[1].page_token.as_deref(), Some("t1"));
        assert_eq!(queries[2].page_token.as_deref(), Some("t2"));
        assert!(queries.iter().all(|q| q.term.as_deref() == Some("term")));
        assert!(queries.iter().all(|q| q.sort == "LastUpdatePostDate:desc"));
        assert!(queries.iter().all(|q| q.page_size == 2));
    }

    #[tokio::test]
    async fn test_exhausted_cursor_makes_no_requests() {
        let backend = ScriptedSearch::new(vec![page(&["NCT1"], None)]);
        let mut cursor = PageCursor::new(&backend, None, 10);

        assert!(!cursor.next_page().await.unwrap().has_more);
        assert!(cursor.is_exhausted());

        let after = cursor.next_page().await.unwrap();
        assert!(after.matches.is_empty());
        assert!(!after.has_more);
        assert_eq!(backend.queries().len(), 1);
        assert_eq!(cursor.pages_fetched(), 1);
    }

    #[tokio::test]
    async fn test_empty_page_with_token_stops() {
        let backend = ScriptedSearch::new(vec![page(&[], Some("dangling"))]);
        let mut cursor = PageCursor::new(&backend, None, 10);

        let first = cursor.next_page().await.unwrap();
        assert!(first.matches.is_empty());
        assert!(!first.has_more);
        assert!(cursor.is_exhausted());
    }

    #[tokio::test]
    async fn test_errors_propagate() {
        let backend = ScriptedSearch::new(vec![
            page(&["NCT1"], Some("t1")),
            Err(Error::RemoteStatus {
                endpoint: "search".to_string(),
                status: 502,
            }),
        ]);
        let mut cursor = PageCursor::new(&backend, None, 1);

        cursor.next_page().await.unwrap();
        let err = cursor.next_page().await.unwrap_err();
        assert!(matches!(err, Error::RemoteStatus { status: 502, .. }));
    }
}
