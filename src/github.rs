use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use octocrab::Octocrab;
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use tracing::{debug, info};

/// Page size for both inventory cursors.
pub const PAGE_SIZE: u32 = 100;

/// A repository as reported by the hosting account inventory.
///
/// `full_name` ("owner/name") is the only immutable identity; `archived`
/// may change between fetches, so it never participates in keying.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteRepo {
    pub full_name: String,
    pub clone_url: String,
    pub archived: bool,
}

/// One page of a single repository connection.
#[derive(Debug, Clone, Default)]
pub struct RepoPage {
    pub repos: Vec<RemoteRepo>,
    pub end_cursor: Option<String>,
    pub has_next_page: bool,
}

/// Page sizes and cursors for one round against both connections.
/// A count of zero means that cursor is exhausted (or disabled).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageRequest {
    pub owned_count: u32,
    pub owned_cursor: Option<String>,
    pub starred_count: u32,
    pub starred_cursor: Option<String>,
}

/// The owned and starred pages returned for one [`PageRequest`].
#[derive(Debug, Clone, Default)]
pub struct InventoryPage {
    pub owned: RepoPage,
    pub starred: RepoPage,
}

/// The hosting API surface the mirror needs: a "who am I" call and
/// cursor-paginated repository listings.
#[async_trait]
pub trait RepoSource: Send + Sync {
    /// Resolve the authenticated account's login.
    async fn viewer_login(&self) -> Result<String>;

    /// Fetch one page of owned and starred repositories.
    async fn fetch_page(&self, login: &str, request: &PageRequest) -> Result<InventoryPage>;
}

/// Build the full remote inventory by walking both cursors to exhaustion.
///
/// Duplicate identities across pages collapse by full name. Any page error
/// aborts the whole fetch; callers never see a half-populated inventory.
pub async fn fetch_inventory(
    source: &dyn RepoSource,
    login: &str,
    include_starred: bool,
) -> Result<Vec<RemoteRepo>> {
    let mut seen: HashMap<String, RemoteRepo> = HashMap::new();
    let mut owned_cursor: Option<String> = None;
    let mut starred_cursor: Option<String> = None;
    let mut owned_remaining = true;
    let mut starred_remaining = include_starred;

    while owned_remaining || starred_remaining {
        let request = PageRequest {
            owned_count: if owned_remaining { PAGE_SIZE } else { 0 },
            owned_cursor: owned_cursor.clone(),
            starred_count: if starred_remaining { PAGE_SIZE } else { 0 },
            starred_cursor: starred_cursor.clone(),
        };

        let page = source.fetch_page(login, &request).await?;

        if owned_remaining {
            for repo in page.owned.repos {
                seen.insert(repo.full_name.clone(), repo);
            }
            // A claimed next page without a cursor cannot be requested;
            // treat that connection as exhausted instead of re-asking forever.
            owned_remaining = page.owned.has_next_page && page.owned.end_cursor.is_some();
            if page.owned.end_cursor.is_some() {
                owned_cursor = page.owned.end_cursor;
            }
        }

        if starred_remaining {
            for repo in page.starred.repos {
                seen.insert(repo.full_name.clone(), repo);
            }
            starred_remaining = page.starred.has_next_page && page.starred.end_cursor.is_some();
            if page.starred.end_cursor.is_some() {
                starred_cursor = page.starred.end_cursor;
            }
        }
    }

    debug!("Inventory contains {} unique repositories", seen.len());
    Ok(seen.into_values().collect())
}

const INVENTORY_QUERY: &str = r#"
query($login: String!, $ownedCount: Int!, $ownedCursor: String, $starredCount: Int!, $starredCursor: String) {
  user(login: $login) {
    repositories(first: $ownedCount, after: $ownedCursor, ownerAffiliations: OWNER) {
      nodes { nameWithOwner url isArchived }
      pageInfo { endCursor hasNextPage }
    }
    starredRepositories(first: $starredCount, after: $starredCursor) {
      nodes { nameWithOwner url isArchived }
      pageInfo { endCursor hasNextPage }
    }
  }
}"#;

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    data: Option<ResponseData>,
    errors: Option<Vec<GraphQlError>>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct ResponseData {
    user: Option<UserNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserNode {
    repositories: Connection,
    starred_repositories: Connection,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Connection {
    nodes: Vec<RepoNode>,
    page_info: PageInfo,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RepoNode {
    name_with_owner: String,
    url: String,
    is_archived: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageInfo {
    end_cursor: Option<String>,
    has_next_page: bool,
}

impl From<Connection> for RepoPage {
    fn from(connection: Connection) -> Self {
        let repos = connection
            .nodes
            .into_iter()
            .map(|node| RemoteRepo {
                full_name: node.name_with_owner,
                clone_url: format!("{}.git", node.url),
                archived: node.is_archived,
            })
            .collect();

        RepoPage {
            repos,
            end_cursor: connection.page_info.end_cursor,
            has_next_page: connection.page_info.has_next_page,
        }
    }
}

/// GitHub client backed by octocrab with token authentication.
pub struct GitHubClient {
    client: Octocrab,
}

impl GitHubClient {
    pub fn new(token: &str) -> Result<Self> {
        let client = Octocrab::builder()
            .personal_token(token.to_string())
            .build()
            .context("Failed to create GitHub client")?;

        Ok(Self { client })
    }

    /// Point the client at a different API host. Used against test servers.
    pub fn with_base_uri(token: &str, base_uri: &str) -> Result<Self> {
        let client = Octocrab::builder()
            .personal_token(token.to_string())
            .base_uri(base_uri)
            .context("Invalid base URI")?
            .build()
            .context("Failed to create GitHub client")?;

        Ok(Self { client })
    }
}

#[async_trait]
impl RepoSource for GitHubClient {
    async fn viewer_login(&self) -> Result<String> {
        let user = self
            .client
            .current()
            .user()
            .await
            .context("Failed to resolve the authenticated user. Check your token.")?;

        info!("Authenticated as GitHub user: {}", user.login);
        Ok(user.login)
    }

    async fn fetch_page(&self, login: &str, request: &PageRequest) -> Result<InventoryPage> {
        debug!(
            "Fetching inventory page: owned={} starred={}",
            request.owned_count, request.starred_count
        );

        let payload = json!({
            "query": INVENTORY_QUERY,
            "variables": {
                "login": login,
                "ownedCount": request.owned_count,
                "ownedCursor": request.owned_cursor,
                "starredCount": request.starred_count,
                "starredCursor": request.starred_cursor,
            },
        });

        let raw: serde_json::Value = self
            .client
            .graphql(&payload)
            .await
            .context("Repository listing query failed")?;

        let response: GraphQlResponse =
            serde_json::from_value(raw).context("Malformed repository listing response")?;

        if let Some(errors) = response.errors {
            if let Some(first) = errors.first() {
                bail!("Repository listing query failed: {}", first.message);
            }
        }

        let user = response
            .data
            .and_then(|data| data.user)
            .ok_or_else(|| anyhow!("Account {} not found", login))?;

        Ok(InventoryPage {
            owned: user.repositories.into(),
            starred: user.starred_repositories.into(),
        })
    }
}
