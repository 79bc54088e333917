//! `Link` header parsing and a lazy page walker over [`IssueSource`].

use tracing::debug;
use url::Url;

use crate::error::GithubError;
use crate::source::IssueSource;
use crate::types::IssueEntry;

/// Extract the `page` query parameter of the `rel="next"` link.
///
/// ```text
/// <https://api.github.com/repositories/1/issues?page=2>; rel="next", <...?page=5>; rel="last"
/// ```
pub fn parse_next_page(link_header: &str) -> Option<u32> {
    link_header.split(',').find_map(|part| {
        let mut pieces = part.split(';');
        let target = pieces.next()?.trim();
        let is_next = pieces.any(|p| {
            let p = p.trim();
            p == "rel=\"next\"" || p == "rel=next"
        });
        if !is_next {
            return None;
        }

        let raw = target.strip_prefix('<')?.strip_suffix('>')?;
        let url = Url::parse(raw).ok()?;
        url.query_pairs()
            .find(|(k, _)| k == "page")
            .and_then(|(_, v)| v.parse().ok())
    })
}

/// Walks the open-issue listing from page one until the API stops
/// advertising a next page. Not restartable: build a new paginator to
/// start over.
pub struct IssuePaginator<'a, S: IssueSource + ?Sized> {
    source: &'a S,
    owner: String,
    name: String,
    per_page: u8,
    next: Option<u32>,
    pages_fetched: u32,
}

impl<'a, S: IssueSource + ?Sized> IssuePaginator<'a, S> {
    pub fn new(source: &'a S, owner: &str, name: &str, per_page: u8) -> Self {
        Self {
            source,
            owner: owner.to_string(),
            name: name.to_string(),
            per_page,
            next: Some(1),
            pages_fetched: 0,
        }
    }

    /// Fetch the next page. `Ok(None)` once the listing is exhausted.
    pub async fn next_page(&mut self) -> Result<Option<Vec<IssueEntry>>, GithubError> {
        let Some(page) = self.next.take() else {
            return Ok(None);
        };

        let result = self
            .source
            .list_issues_page(&self.owner, &self.name, page, self.per_page)
            .await?;
        self.pages_fetched += 1;

        // A next link that does not move forward would loop forever.
        self.next = result.next_page.filter(|n| *n > page);

        debug!(
            repo = %format!("{}/{}", self.owner, self.name),
            page,
            entries = result.entries.len(),
            has_next = self.next.is_some(),
            "fetched issue page"
        );

        Ok(Some(result.entries))
    }

    pub fn pages_fetched(&self) -> u32 {
        self.pages_fetched
    }
}
