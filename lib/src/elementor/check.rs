use std::fmt;

use rustc_hash::FxHashMap;

use crate::elementor::Element;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Issue {
    pub severity: Severity,
    /// Slash-separated element ids from the top-level section down.
    pub path: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Report {
    pub issues: Vec<Issue>,
}

/// Column sizes in a row may sum to slightly over 100 (`33.4 * 3`).
const COLUMN_SLACK: f64 = 0.5;

impl Report {
    pub fn has_errors(&self) -> bool {
        self.issues.iter().any(|i| i.severity == Severity::Error)
    }

    pub fn errors(&self) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(|i| i.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(|i| i.severity == Severity::Warning)
    }

    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    /// Folds `other`'s issues into `self`, prefixing their paths.
    pub fn absorb(&mut self, prefix: &str, other: Report) {
        self.issues.extend(other.issues.into_iter().map(|mut issue| {
            issue.path = format!("{prefix}:{}", issue.path);
            issue
        }));
    }

    fn push(&mut self, severity: Severity, path: &[&str], message: impl Into<String>) {
        self.issues.push(Issue { severity, path: path.join("/"), message: message.into() });
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.severity {
            Severity::Warning => "warning",
            Severity::Error => "error",
        };

        write!(f, "{level}: {} ({})", self.message, self.path)
    }
}

/// Checks the structural well-formedness of one page's section list.
pub fn check(sections: &[Element]) -> Report {
    let mut report = Report::default();
    let mut ids: FxHashMap<&str, usize> = FxHashMap::default();
    let mut path = vec![];
    for section in sections {
        if !section.is_section() {
            report.push(Severity::Error, &[section.id()], format!(
                "top-level element is a {}, not a section", section.kind()
            ));
        }

        visit(section, &mut path, &mut ids, &mut report);
    }

    let mut duplicates: Vec<_> = ids.into_iter().filter(|(_, n)| *n > 1).collect();
    duplicates.sort();
    for (id, n) in duplicates {
        report.push(Severity::Error, &[id], format!("element id used {n} times"));
    }

    report
}

fn visit<'a>(
    element: &'a Element,
    path: &mut Vec<&'a str>,
    ids: &mut FxHashMap<&'a str, usize>,
    report: &mut Report,
) {
    path.push(element.id());
    if element.id().is_empty() {
        report.push(Severity::Error, path, format!("{} without an id", element.kind()));
    } else {
        *ids.entry(element.id()).or_default() += 1;
    }

    match element {
        Element::Widget(widget) => {
            if widget.widget_type.trim().is_empty() {
                report.push(Severity::Error, path, "widget without a widgetType");
            }

            if widget.settings.is_empty() {
                report.push(Severity::Error, path, format!(
                    "`{}` widget has empty settings", widget.widget_type
                ));
            }

            if !widget.elements.is_empty() {
                report.push(Severity::Error, path, "widget has child elements");
            }
        }
        Element::Section(section) => {
            if section.elements.iter().any(|e| !e.is_column()) {
                report.push(Severity::Error, path, "section contains a non-column element");
            }

            let mut total = 0.0;
            for column in section.elements.iter().filter(|e| e.is_column()) {
                match column.column_size() {
                    Some(size) => total += size,
                    None => report.push(Severity::Warning, path, format!(
                        "column `{}` has no _column_size", column.id()
                    )),
                }
            }

            if total > 100.0 + COLUMN_SLACK {
                report.push(Severity::Warning, path, format!(
                    "column sizes sum to {total}, more than 100"
                ));
            }
        }
        Element::Column(column) => {
            if column.elements.iter().any(|e| e.is_column()) {
                report.push(Severity::Error, path, "column contains a column");
            }
        }
    }

    for child in element.children() {
        visit(child, path, ids, report);
    }

    path.pop();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings;

    fn page() -> Vec<Element> {
        vec![Element::section("s1", settings! {}, vec![
            Element::column("c1", 50, vec![
                Element::widget("w1", "cholot-title", settings! { "title": "Asbest" }),
            ]),
            Element::column("c2", 50, vec![
                Element::widget("w2", "text-editor", settings! { "editor": "<p>x</p>" }),
            ]),
        ])]
    }

    #[test]
    fn clean_page_has_no_issues() {
        assert!(check(&page()).is_clean());
    }

    #[test]
    fn flags_duplicate_ids_and_empty_settings() {
        let mut sections = page();
        sections[0].children_mut()[1].children_mut()[0] = Element::widget("w1", "image", settings! {});

        let report = check(&sections);
        assert!(report.has_errors());
        let messages: Vec<_> = report.errors().map(|i| i.message.as_str()).collect();
        assert!(messages.contains(&"`image` widget has empty settings"), "{messages:?}");
        assert!(messages.contains(&"element id used 2 times"), "{messages:?}");

        let empty = report.errors().find(|i| i.message.contains("empty settings")).unwrap();
        assert_eq!(empty.path, "s1/c2/w1");
    }

    #[test]
    fn warns_on_oversized_rows() {
        let mut sections = page();
        sections[0].children_mut()[1].settings_mut().insert("_column_size".into(), 66.into());

        let report = check(&sections);
        assert!(!report.has_errors());
        assert_eq!(report.warnings().count(), 1);

        let mut thirds = page();
        let column = thirds[0].children()[0].clone();
        thirds[0].children_mut().push(column);
        for (i, c) in thirds[0].children_mut().iter_mut().enumerate() {
            c.set_id(format!("c{i}"));
            c.settings_mut().insert("_column_size".into(), serde_json::json!(33.4));
            c.children_mut()[0].set_id(format!("w{i}"));
        }

        assert!(check(&thirds).is_clean());
    }

    #[test]
    fn flags_misplaced_elements() {
        let stray = Element::widget("w9", "cholot-title", settings! { "title": "x" });
        let mut sections = page();
        sections[0].children_mut().push(stray.clone());
        sections.push(stray);

        let report = check(&sections);
        let messages: Vec<_> = report.errors().map(|i| i.message.clone()).collect();
        assert!(messages.iter().any(|m| m == "section contains a non-column element"));
        assert!(messages.iter().any(|m| m == "top-level element is a widget, not a section"));
    }
}
