//! Portfolio-level rollups over enriched repositories.

use chrono::{DateTime, Utc};

use crate::types::{ActivityStatus, EnrichedRepository, LanguageCount, PortfolioMetrics};

/// Languages reported in the portfolio histogram
pub const TOP_LANGUAGES: usize = 5;

/// Months used to turn velocity into an estimated commit count
const MONTHS_PER_YEAR: u64 = 12;

/// Roll up enriched repositories into portfolio metrics.
///
/// `total_commits` is an estimate (`velocity * 12` per repository).
/// Languages are ranked by repository count, ties keeping encounter order.
/// Topics are de-duplicated in encounter order.
pub fn compute_portfolio(repos: &[EnrichedRepository], now: DateTime<Utc>) -> PortfolioMetrics {
    let mut languages: Vec<LanguageCount> = Vec::new();
    let mut domains: Vec<String> = Vec::new();

    for repo in repos {
        if let Some(ref lang) = repo.repo.language {
            match languages.iter_mut().find(|l| &l.lang == lang) {
                Some(entry) => entry.count += 1,
                None => languages.push(LanguageCount {
                    lang: lang.clone(),
                    count: 1,
                }),
            }
        }

        for topic in &repo.repo.topics {
            if !domains.contains(topic) {
                domains.push(topic.clone());
            }
        }
    }

    // Stable sort keeps first-seen order among equal counts
    languages.sort_by(|a, b| b.count.cmp(&a.count));
    languages.truncate(TOP_LANGUAGES);

    PortfolioMetrics {
        total_repos: repos.len(),
        active_projects: repos
            .iter()
            .filter(|r| r.activity_status == ActivityStatus::Active)
            .count(),
        total_stars: repos.iter().map(|r| r.repo.stargazers_count).sum(),
        total_commits: repos
            .iter()
            .map(|r| u64::from(r.commit_velocity) * MONTHS_PER_YEAR)
            .sum(),
        primary_languages: languages,
        domains,
        last_updated: now,
    }
}
