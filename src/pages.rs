//! HTML pages for the directory.
//!
//! Every page is built on [`base_document`] and carries the request context
//! in its footer. Links use the directory's routes:
//!
//! | Route | Page |
//! |---|---|
//! | `/` | [`render_home`]: all employees |
//! | `/employee/{id}` | [`render_employee`]: one profile |
//! | `/add`, `/edit/{id}` | [`render_form`]: add or edit form posting to `/save` |
//! | `/info` | [`render_info`]: instance metadata and the stress trigger |
//!
//! [`export_site`] writes each route as `{route}/index.html` under an output
//! directory, so any static file server serves the same URLs.

use crate::badges::{self, Badge};
use crate::context::RequestContext;
use crate::directory::{Directory, DirectoryError};
use crate::imaging::ImageBackend;
use crate::types::{Employee, EmployeeView};
use maud::{DOCTYPE, Markup, html};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Directory(#[from] DirectoryError),
}

const CSS: &str = include_str!("../static/style.css");

/// Default duration offered by the stress button on the info page.
pub const STRESS_SECONDS: u64 = 60;

// ============================================================================
// HTML Components
// ============================================================================

/// Renders the base HTML document structure
fn base_document(title: &str, ctx: &RequestContext, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) " · Employee Directory" }
                style { (CSS) }
            }
            body {
                (site_header())
                main { (content) }
                (site_footer(ctx))
            }
        }
    }
}

fn site_header() -> Markup {
    html! {
        header.site-header {
            a.brand href="/" { "Employee Directory" }
            nav {
                a href="/" { "Home" }
                a href="/add" { "Add" }
                a href="/info" { "Info" }
            }
        }
    }
}

fn site_footer(ctx: &RequestContext) -> Markup {
    html! {
        footer.site-footer {
            "Served by " code { (ctx.instance_id) } " in " code { (ctx.availability_zone) }
        }
    }
}

fn render_badges(badges: &[&Badge]) -> Markup {
    html! {
        @if !badges.is_empty() {
            ul.badges {
                @for badge in badges {
                    li.badge title=(badge.id) { (badge.label) }
                }
            }
        }
    }
}

// ============================================================================
// Page Renderers
// ============================================================================

/// Renders the home page: every employee in a table
pub fn render_home(employees: &[EmployeeView], ctx: &RequestContext) -> Markup {
    let content = html! {
        h1 { "Employees" }
        @if employees.is_empty() {
            p.empty { "No employees yet. " a href="/add" { "Add the first one." } }
        } @else {
            table.employee-table {
                thead {
                    tr { th {} th { "Name" } th { "Location" } th { "Job title" } th { "Badges" } }
                }
                tbody {
                    @for view in employees {
                        @let employee = &view.employee;
                        tr {
                            td {
                                @if let Some(url) = &view.photo_url {
                                    img.photo src=(url) alt=(employee.full_name);
                                } @else {
                                    span.photo-placeholder {}
                                }
                            }
                            td { a href={ "/employee/" (employee.id) } { (employee.full_name) } }
                            td { (employee.location) }
                            td { (employee.job_title) }
                            td { (render_badges(&view.badges)) }
                        }
                    }
                }
            }
        }
    };
    base_document("Employees", ctx, content)
}

/// Renders one employee's profile
pub fn render_employee(view: &EmployeeView, ctx: &RequestContext) -> Markup {
    let employee = &view.employee;
    let content = html! {
        article.profile {
            @if let Some(url) = &view.photo_url {
                img.photo src=(url) alt=(employee.full_name);
            }
            div {
                h1 { (employee.full_name) }
                dl {
                    dt { "Location" } dd { (employee.location) }
                    dt { "Job title" } dd { (employee.job_title) }
                }
                (render_badges(&view.badges))
                div.actions {
                    a href={ "/edit/" (employee.id) } { "Edit" }
                    form method="post" action={ "/delete/" (employee.id) } {
                        button type="submit" { "Delete" }
                    }
                }
            }
        }
    };
    base_document(&employee.full_name, ctx, content)
}

/// Renders the add form (no employee) or the edit form (prefilled)
pub fn render_form(employee: Option<&Employee>, ctx: &RequestContext) -> Markup {
    let heading = if employee.is_some() {
        "Edit employee"
    } else {
        "Add employee"
    };
    let value = |f: fn(&Employee) -> String| employee.map(f).unwrap_or_default();
    let catalog: Vec<&str> = badges::CATALOG.iter().map(|b| b.id).collect();

    let content = html! {
        h1 { (heading) }
        form.employee-form method="post" action="/save" enctype="multipart/form-data" {
            input type="hidden" name="employee_id" value=(value(|e| e.id.clone()));
            label {
                "Full name"
                input type="text" name="full_name" required value=(value(|e| e.full_name.clone()));
            }
            label {
                "Location"
                input type="text" name="location" required value=(value(|e| e.location.clone()));
            }
            label {
                "Job title"
                input type="text" name="job_title" required value=(value(|e| e.job_title.clone()));
            }
            label {
                "Badges"
                input type="text" name="badges" value=(value(|e| badges::join_badges(&e.badges)));
                span.hint { "Comma-separated: " (catalog.join(", ")) }
            }
            label {
                "Photo"
                input type="file" name="photo" accept="image/*";
                @if employee.is_some_and(|e| e.object_key.is_some()) {
                    span.hint { "Leave empty to keep the current photo." }
                }
            }
            div.actions {
                button type="submit" { "Save" }
                a href="/" { "Cancel" }
            }
        }
    };
    base_document(heading, ctx, content)
}

/// Renders the info page: instance metadata and the stress trigger
pub fn render_info(ctx: &RequestContext) -> Markup {
    let content = html! {
        h1 { "Instance info" }
        table.employee-table {
            tbody {
                tr { th { "instance_id" } td { code { (ctx.instance_id) } } }
                tr { th { "availability_zone" } td { code { (ctx.availability_zone) } } }
            }
        }
        form method="post" action={ "/info/stress/" (STRESS_SECONDS) } {
            div.actions {
                button type="submit" { "Stress CPU for " (STRESS_SECONDS) " seconds" }
            }
        }
    };
    base_document("Info", ctx, content)
}

// ============================================================================
// Static export
// ============================================================================

fn write_page(out: &Path, route: &str, page: Markup) -> Result<PathBuf, ExportError> {
    let dir = out.join(route);
    fs::create_dir_all(&dir)?;
    let path = dir.join("index.html");
    fs::write(&path, page.into_string())?;
    Ok(path)
}

/// Render every page into `out`. Returns the files written, home first.
pub fn export_site<B: ImageBackend>(
    directory: &Directory<B>,
    ctx: &RequestContext,
    out: &Path,
) -> Result<Vec<PathBuf>, ExportError> {
    let employees = directory.list()?;
    let mut written = vec![
        write_page(out, "", render_home(&employees, ctx))?,
        write_page(out, "add", render_form(None, ctx))?,
        write_page(out, "info", render_info(ctx))?,
    ];
    for view in &employees {
        let id = &view.employee.id;
        written.push(write_page(
            out,
            &format!("employee/{id}"),
            render_employee(view, ctx),
        )?);
        written.push(write_page(
            out,
            &format!("edit/{id}"),
            render_form(Some(&view.employee), ctx),
        )?);
    }
    log::info!("exported {} pages to {}", written.len(), out.display());
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> RequestContext {
        RequestContext {
            instance_id: "i-0123abcd".into(),
            availability_zone: "us-west-2b".into(),
        }
    }

    fn employee(id: &str, name: &str, badges: &[&str]) -> Employee {
        Employee {
            id: id.into(),
            full_name: name.into(),
            location: "NYC".into(),
            job_title: "Engineer".into(),
            badges: badges.iter().map(|b| b.to_string()).collect(),
            object_key: None,
        }
    }

    fn view(employee: Employee, photo_url: Option<&str>) -> EmployeeView {
        EmployeeView {
            badges: badges::resolve(&employee.badges),
            photo_url: photo_url.map(String::from),
            employee,
        }
    }

    #[test]
    fn base_document_includes_doctype_and_footer() {
        let doc = base_document("Test", &ctx(), html! { p { "test" } }).into_string();
        assert!(doc.starts_with("<!DOCTYPE html>"));
        assert!(doc.contains("i-0123abcd"));
        assert!(doc.contains("us-west-2b"));
    }

    #[test]
    fn home_empty_directory() {
        let html = render_home(&[], &ctx()).into_string();
        assert!(html.contains("No employees yet"));
        assert!(!html.contains("<table"));
    }

    #[test]
    fn home_lists_employees() {
        let views = vec![
            view(employee("1", "Alice", &[]), None),
            view(employee("2", "Bob", &[]), None),
        ];
        let html = render_home(&views, &ctx()).into_string();
        assert!(html.contains("Alice"));
        assert!(html.contains("Bob"));
        assert!(html.contains(r#"href="/employee/2""#));
    }

    #[test]
    fn home_shows_photo_only_with_url() {
        let views = vec![
            view(employee("1", "Alice", &[]), Some("https://s3.example.com/abc.png")),
            view(employee("2", "Bob", &[]), None),
        ];
        let html = render_home(&views, &ctx()).into_string();
        assert!(html.contains("https://s3.example.com/abc.png"));
        assert_eq!(html.matches("<img").count(), 1);
        assert!(html.contains("photo-placeholder"));
    }

    #[test]
    fn employee_page_shows_badges_and_photo() {
        let page = render_employee(
            &view(employee("10", "Frank", &["coffee", "trophy"]), Some("https://s3.example.com/x.png")),
            &ctx(),
        )
        .into_string();
        assert!(page.contains("Frank"));
        assert!(page.contains("Coffee Snob"));
        assert!(page.contains("Employee of the Month"));
        assert!(page.contains("https://s3.example.com/x.png"));
        assert!(page.contains(r#"action="/delete/10""#));
    }

    #[test]
    fn unassigned_badge_not_rendered() {
        let page = render_employee(&view(employee("11", "Gus", &[]), None), &ctx()).into_string();
        assert!(!page.contains("Employee of the Month"));
        assert!(!page.contains("<img"));
    }

    #[test]
    fn add_form_has_fields_and_no_values() {
        let html = render_form(None, &ctx()).into_string();
        assert!(html.contains("Add employee"));
        for name in ["employee_id", "full_name", "location", "job_title", "badges", "photo"] {
            assert!(html.contains(&format!(r#"name="{name}""#)), "{name}");
        }
        assert!(html.contains(r#"enctype="multipart/form-data""#));
        assert!(html.contains(r#"name="employee_id" value="""#));
    }

    #[test]
    fn edit_form_is_prefilled() {
        let mut e = employee("42", "Dana", &["plane", "bike"]);
        e.object_key = Some("employee_pic/ab.png".into());
        let html = render_form(Some(&e), &ctx()).into_string();
        assert!(html.contains("Edit employee"));
        assert!(html.contains(r#"value="42""#));
        assert!(html.contains(r#"value="Dana""#));
        assert!(html.contains(r#"value="plane,bike""#));
        assert!(html.contains("keep the current photo"));
    }

    #[test]
    fn info_page_shows_instance_data() {
        let html = render_info(&ctx()).into_string();
        assert!(html.contains("instance_id"));
        assert!(html.contains("availability_zone"));
        assert!(html.contains("i-0123abcd"));
        assert!(html.contains(r#"action="/info/stress/60""#));
    }

    #[test]
    fn html_is_escaped() {
        let html = render_home(
            &[view(employee("1", "<script>alert('xss')</script>", &[]), None)],
            &ctx(),
        )
        .into_string();
        assert!(!html.contains("<script>alert"));
        assert!(html.contains("&lt;script&gt;"));
    }
}
