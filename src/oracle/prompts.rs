use crate::traversal::ContentMode;

const RESPONSE_FORMATS: &str = r#"Your response MUST be valid JSON following EXACTLY ONE of these formats:

1) The current page IS the final careers / job listing page:

{"action": "CAREERS_PAGE_FOUND", "next_link": null}

2) The current page is NOT final, but one link is more promising for reaching it:

{"action": "NEXT_LINK_TO_CRAWL", "next_link": "<the single best absolute URL>"}

3) Nothing career-related is left to follow:

{"action": "NO_PROMISING_LINKS", "next_link": null}

Return only the JSON object, with no explanation or formatting around it."#;

const LINKS_DEFINITION: &str = "A true careers page is one where the job listings are visible or directly reachable without navigating deeper.

You are not reading page text. You are reading the link structure of the page.

- Links containing words like jobs, open positions, vacancies, join us, apply, rekry, työpaikat or pointing at a recruitment portal (ATS domain) are strong signals.
- The final careers page is the deepest, most complete job listing page, not a marketing page, summary page or redirect layer.
- Always check for links such as domain/careers/jobs, domain/careers/all-jobs or domain/careers/browse.
- Do not choose a single job posting unless it is clear the site has only one job available.";

const TEXT_DEFINITION: &str = "A true careers page is the final page where job listings are fully displayed:

- the page contains open positions, AND
- there is no further \"See all jobs\", \"View more\", \"Show all\" or similar link leading to a more complete listing.

If a page lists jobs but also links to a more complete listing (\"All open positions\", \"Browse full job listings\", \"Visit recruitment portal\", \"View all openings\"), it is NOT the careers page; return the link to the full listing instead.

A careers page may include filters and pagination when it is the central job board. Links to an ATS job portal are valid when they lead to full listings rather than single application pages.";

/// Default instruction sent with every oracle request for the given mode
pub fn default_instruction(mode: ContentMode) -> String {
    match mode {
        ContentMode::Links => format!(
            "You are analyzing the hyperlinks extracted from a web page, one per line.\n\
             Decide whether the page they came from already is the FINAL careers page, \
             or which link should be followed next.\n\n\
             {LINKS_DEFINITION}\n\n---\n\n{RESPONSE_FORMATS}\n\n\
             Prefer large hub links over individual job postings. \
             If the best link is the page you are already on, answer CAREERS_PAGE_FOUND."
        ),
        ContentMode::Text => format!(
            "You are analyzing the markdown content of a web page.\n\
             Decide whether this page is the FINAL careers page, \
             or whether another link must be followed to reach the final job listing.\n\n\
             {TEXT_DEFINITION}\n\n---\n\n{RESPONSE_FORMATS}\n\n\
             If several job links exist, choose the most comprehensive, highest-level listing. \
             If uncertain, prefer returning a link over marking the page as final."
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instructions_document_every_action() {
        for mode in [ContentMode::Links, ContentMode::Text] {
            let instruction = default_instruction(mode);
            assert!(instruction.contains("CAREERS_PAGE_FOUND"));
            assert!(instruction.contains("NEXT_LINK_TO_CRAWL"));
            assert!(instruction.contains("NO_PROMISING_LINKS"));
        }
        assert!(default_instruction(ContentMode::Links).contains("link structure"));
        assert!(default_instruction(ContentMode::Text).contains("markdown"));
    }
}
