//! Matrix Renderer - prints a page's matrix to the terminal
//!
//! Rows are shown partition by partition, one block per registrable domain.
//! Collapsed domains hide the subdomain rows that carry no rule of their
//! own and show their totals on a single line instead.

use std::fmt::Write;

use crate::core::RequestType;
use crate::grouping::{BlacklistSummary, DomainSection, Groups, Partition};
use crate::matrix::HostnameAggregate;
use crate::switchboard::PageContext;

use super::console::{Console, CELL_WIDTH, HOSTNAME_WIDTH};

/// Column heading of a request type
pub fn column_label(request_type: RequestType) -> &'static str {
    match request_type {
        RequestType::All => "*",
        RequestType::MainFrame => "page",
        RequestType::Stylesheet => "css",
        RequestType::Cookie => "cookie",
        RequestType::Image => "image",
        RequestType::Object => "plugin",
        RequestType::Script => "script",
        RequestType::XmlHttpRequest => "xhr",
        RequestType::SubFrame => "frame",
        RequestType::Other => "other",
    }
}

/// Renders a page context as a colored text matrix
///
/// # Example
///
/// ```ignore
/// let groups = page.classify();
/// MatrixRenderer::new().print(&page, &groups);
/// ```
pub struct MatrixRenderer {
    console: Console,

    /// Whether to print headings of partitions without rows
    show_empty_groups: bool,
}

impl MatrixRenderer {
    pub fn new() -> Self {
        Self {
            console: Console::new(),
            show_empty_groups: false,
        }
    }

    pub fn with_console(console: Console) -> Self {
        Self {
            console,
            show_empty_groups: false,
        }
    }

    pub fn show_empty_groups(mut self, show: bool) -> Self {
        self.show_empty_groups = show;
        self
    }

    pub fn console(&self) -> &Console {
        &self.console
    }

    pub fn print(&self, page: &PageContext, groups: &Groups) {
        print!("{}", self.render(page, groups));
    }

    pub fn render(&self, page: &PageContext, groups: &Groups) -> String {
        let mut out = String::new();
        let scope = page.scope();
        let matrix = page.matrix();
        let settings = page.settings();
        let columns = RequestType::ALL.len();

        let _ = writeln!(out, "Page:  {}", page.page_url());
        let _ = writeln!(
            out,
            "Scope: {}{}",
            scope,
            if page.uses_page_scope() { " (page)" } else { " (global)" }
        );
        out.push_str(&self.header());
        if let Some(totals) = matrix.totals() {
            out.push_str(&self.row("*", totals, 0));
        }
        let _ = writeln!(out, "{}", self.console.separator(columns));

        for group in groups.iter() {
            if group.is_empty() && !self.show_empty_groups {
                continue;
            }

            if group.partition == Partition::Blacklisted {
                let summary = BlacklistSummary::compute(group, matrix, page.resolver(), &scope);
                let title = format!("{} ({} blacklisted)", group.partition, summary.blacklisted);
                let _ = writeln!(out, "{}", self.console.heading(&title));
                out.push_str(&self.row("(all)", &summary.totals, 0));
                if settings.hide_blacklisted {
                    continue;
                }
            } else {
                let _ = writeln!(out, "{}", self.console.heading(&group.partition.to_string()));
            }

            for section in &group.sections {
                out.push_str(&self.section(page, group.partition, section));
            }
        }

        out
    }

    fn section(&self, page: &PageContext, partition: Partition, section: &DomainSection) -> String {
        let matrix = page.matrix();
        let collapsed = page.collapse_state(&section.domain)
            && section.is_collapsible(partition, page.resolver(), &page.scope());

        let mut out = String::new();
        let mut hidden = 0;
        for hostname in &section.hostnames {
            let Some(aggregate) = matrix.get(hostname) else {
                continue;
            };
            let is_domain = *hostname == section.domain;
            if collapsed && !is_domain && !aggregate.has_specific_rule() {
                hidden += 1;
                continue;
            }
            out.push_str(&self.row(hostname, aggregate, if is_domain { 0 } else { 2 }));
        }

        if hidden > 0 {
            let label = format!("+{} more", hidden);
            out.push_str(&self.row(&label, &section.summary(matrix), 2));
        }
        out
    }

    fn header(&self) -> String {
        let mut line = format!("{:<width$}", "", width = HOSTNAME_WIDTH);
        for ty in RequestType::ALL {
            let _ = write!(line, "{:>width$}", column_label(ty), width = CELL_WIDTH);
        }
        line.push('\n');
        line
    }

    fn row(&self, label: &str, aggregate: &HostnameAggregate, indent: usize) -> String {
        let label = format!("{}{}", " ".repeat(indent), label);
        let mut line = format!("{:<width$}", label, width = HOSTNAME_WIDTH);
        for entry in aggregate.entries() {
            line.push_str(&self.console.cell(entry));
        }
        line.push('\n');
        line
    }
}

impl Default for MatrixRenderer {
    fn default() -> Self {
        Self::new()
    }
}
