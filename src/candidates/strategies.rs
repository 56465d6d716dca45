//! Candidate extraction strategies over a single document.

use crate::config::CandidateRules;
use crate::document::{DocumentError, DomQuery};
use crate::models::Candidate;
use crate::tables::{caption_title, preceding_sibling_title};
use crate::text::{char_len, fold, normalize};

/// Lexical scoring of link text (and optional row context) against a keyword.
pub struct KeywordMatcher<'r> {
    keyword: String,
    rules: &'r CandidateRules,
}

impl<'r> KeywordMatcher<'r> {
    pub fn new(keyword: &str, rules: &'r CandidateRules) -> Self {
        Self {
            keyword: fold(keyword),
            rules,
        }
    }

    /// Score a name and, for table rows, its row text. An empty keyword scores 0.
    pub fn score(&self, name: &str, row_text: Option<&str>) -> u32 {
        if self.keyword.is_empty() {
            return 0;
        }

        let name = name.to_lowercase();
        let mut score = 0;
        if name == self.keyword {
            score += self.rules.exact_match_score;
        }
        if name.contains(&self.keyword) {
            score += self.rules.contains_match_score;
        }
        if let Some(row) = row_text {
            if row.to_lowercase().contains(&self.keyword) {
                score += self.rules.row_match_score;
            }
        }
        score
    }
}

/// The two extraction passes, in the order they are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Links inside table rows, with row context and table title.
    TableRows,
    /// Any anchor on the page, minus navigation chrome.
    Anchors,
}

impl Strategy {
    pub fn extract<D: DomQuery>(
        self,
        doc: &D,
        keyword: &str,
        rules: &CandidateRules,
    ) -> Result<Vec<Candidate>, DocumentError> {
        match self {
            Self::TableRows => table_row_candidates(doc, keyword, rules),
            Self::Anchors => anchor_candidates(doc, keyword, rules),
        }
    }
}

/// Emit one candidate per link found in a table row.
pub fn table_row_candidates<D: DomQuery>(
    doc: &D,
    keyword: &str,
    rules: &CandidateRules,
) -> Result<Vec<Candidate>, DocumentError> {
    let matcher = KeywordMatcher::new(keyword, rules);
    let mut out = Vec::new();

    for table in doc.select("table")? {
        let title = match caption_title(doc, table)? {
            Some(caption) => caption,
            None => preceding_sibling_title(doc, table, rules.max_title_chars).unwrap_or_default(),
        };

        for row in doc.select_within(table, "tbody tr, tr")? {
            let links = doc.select_within(row, "a")?;
            if links.is_empty() {
                continue;
            }
            let row_text = normalize(&doc.text(row));

            for link in links {
                let name = normalize(&doc.text(link));
                if name.is_empty() {
                    continue;
                }
                let score = matcher.score(&name, Some(&row_text));
                out.push(Candidate::new(name, row_text.clone(), title.clone(), score));
            }
        }
    }

    Ok(out)
}

/// Emit a candidate for every plausible anchor, ignoring navigation words.
pub fn anchor_candidates<D: DomQuery>(
    doc: &D,
    keyword: &str,
    rules: &CandidateRules,
) -> Result<Vec<Candidate>, DocumentError> {
    let matcher = KeywordMatcher::new(keyword, rules);
    let mut out = Vec::new();

    for anchor in doc.select("a")? {
        let text = normalize(&doc.text(anchor));
        let len = char_len(&text);
        if text.is_empty() || len < rules.min_anchor_chars || len > rules.max_anchor_chars {
            continue;
        }

        let lower = text.to_lowercase();
        if rules
            .anchor_stoplist
            .iter()
            .any(|blocked| blocked.to_lowercase() == lower)
        {
            continue;
        }

        let score = matcher.score(&text, None);
        out.push(Candidate::new(text, "", "", score));
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::HtmlDocument;

    fn rules() -> CandidateRules {
        CandidateRules::default()
    }

    #[test]
    fn scoring_tiers_add_up() {
        let rules = rules();
        let matcher = KeywordMatcher::new(" ABC ", &rules);
        assert_eq!(matcher.score("abc", Some("abc seoul")), 180);
        assert_eq!(matcher.score("ABC Corp", Some("ABC Corp seoul")), 80);
        assert_eq!(matcher.score("Other", Some("parent: ABC")), 20);
        assert_eq!(matcher.score("Other", None), 0);
    }

    #[test]
    fn empty_keyword_scores_zero() {
        let rules = rules();
        let matcher = KeywordMatcher::new("   ", &rules);
        assert_eq!(matcher.score("anything", Some("anything")), 0);
    }

    #[test]
    fn table_rows_carry_context_and_caption() {
        let doc = HtmlDocument::parse(
            "",
            r#"
            <table>
              <caption> 검색 결과 </caption>
              <tbody>
                <tr><th>No</th><th>기업명</th></tr>
                <tr><td>1</td><td><a href="/c">테스트기업</a></td><td>제조업</td></tr>
                <tr><td>2</td><td>링크 없음</td></tr>
              </tbody>
            </table>
            "#,
        );

        let found = table_row_candidates(&doc, "테스트기업", &rules()).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "테스트기업");
        assert_eq!(found[0].row_text, "1 테스트기업 제조업");
        assert_eq!(found[0].table_title, "검색 결과");
        assert_eq!(found[0].match_score, 180);
    }

    #[test]
    fn title_falls_back_to_short_preceding_sibling() {
        let long = "x".repeat(61);
        let html = format!(
            r#"<div><h4>기업 목록</h4><p>{}</p><table><tr><td><a href="/c">A사</a></td></tr></table></div>"#,
            long
        );
        let doc = HtmlDocument::parse("", &html);

        let found = table_row_candidates(&doc, "", &rules()).unwrap();
        assert_eq!(found[0].table_title, "기업 목록");
        assert_eq!(found[0].match_score, 0);
    }

    #[test]
    fn every_link_in_a_row_is_emitted() {
        let doc = HtmlDocument::parse(
            "",
            r#"<table><tr><td><a href="/c">Parent</a></td><td><a href="/c">Child</a></td></tr></table>"#,
        );
        let names: Vec<_> = table_row_candidates(&doc, "child", &rules())
            .unwrap()
            .into_iter()
            .map(|c| (c.name, c.match_score))
            .collect();
        assert_eq!(
            names,
            vec![("Parent".to_string(), 20), ("Child".to_string(), 180)]
        );
    }

    #[test]
    fn anchors_filter_length_and_stoplist() {
        let doc = HtmlDocument::parse(
            "",
            &format!(
                r#"<a href="/c">A</a><a href="/c">MORE</a><a href="/c">상세보기</a>
                   <a href="/c">{}</a><a href="/c">  Alpha   Holdings </a><a href="/c"> </a>"#,
                "y".repeat(71)
            ),
        );

        let found = anchor_candidates(&doc, "alpha", &rules()).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Alpha Holdings");
        assert_eq!(found[0].match_score, 60);
        assert!(found[0].table_title.is_empty());
    }
}
