use std::fmt::Write;

use super::{Template, View, ViewData};
use crate::api::format::{project_path, projects_path};
use crate::database::models::{FieldErrors, Project};

pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn page(view: &View) -> String {
    let mut body = String::new();

    if let Some(notice) = &view.notice {
        let _ = write!(body, "<p class=\"notice\">{}</p>", escape(notice));
    }

    match (&view.template, &view.data) {
        (Template::Index, ViewData::Collection(projects)) => {
            body.push_str("<h1>Projects</h1>");
            project_list(&mut body, projects);
            let _ = write!(body, "<a href=\"{}/new\">New project</a>", projects_path());
        }
        (_, ViewData::Collection(projects)) => {
            body.push_str("<h1>My projects</h1>");
            project_list(&mut body, projects);
        }
        (Template::New, ViewData::Form { project, errors }) => {
            body.push_str("<h1>New project</h1>");
            form(&mut body, project, errors, &projects_path());
        }
        (_, ViewData::Form { project, errors }) => {
            body.push_str("<h1>Editing project</h1>");
            let action = project_path(project).unwrap_or_else(projects_path);
            form(&mut body, project, errors, &action);
        }
        (_, ViewData::Record(project)) => {
            project_detail(&mut body, project);
        }
    }

    layout(&body)
}

pub fn redirect_body(location: &str) -> String {
    let location = escape(location);
    layout(&format!(
        "<p>You are being <a href=\"{}\">redirected</a>.</p>",
        location
    ))
}

fn layout(body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"><title>Projects</title></head><body>{}</body></html>\n",
        body
    )
}

fn project_list(out: &mut String, projects: &[Project]) {
    if projects.is_empty() {
        out.push_str("<p>No projects yet.</p>");
        return;
    }
    out.push_str("<ul class=\"projects\">");
    for project in projects {
        match project_path(project) {
            Some(path) => {
                let _ = write!(out, "<li><a href=\"{}\">{}</a></li>", path, escape(&project.name));
            }
            None => {
                let _ = write!(out, "<li>{}</li>", escape(&project.name));
            }
        }
    }
    out.push_str("</ul>");
}

fn project_detail(out: &mut String, project: &Project) {
    let _ = write!(out, "<h1>{}</h1>", escape(&project.name));
    if let Some(description) = &project.description {
        let _ = write!(out, "<p>{}</p>", escape(description));
    }
    if let Some(path) = project_path(project) {
        let _ = write!(out, "<a href=\"{}/edit\">Edit</a> ", path);
    }
    let _ = write!(out, "<a href=\"{}\">Back</a>", projects_path());
}

fn form(out: &mut String, project: &Project, errors: &FieldErrors, action: &str) {
    if !errors.is_empty() {
        out.push_str("<ul class=\"errors\">");
        for (field, message) in errors.iter() {
            let _ = write!(out, "<li>{} {}</li>", escape(field), escape(message));
        }
        out.push_str("</ul>");
    }

    let _ = write!(out, "<form method=\"post\" action=\"{}\">", escape(action));
    let _ = write!(
        out,
        "<label>Name <input name=\"name\" value=\"{}\"></label>",
        escape(&project.name)
    );
    let _ = write!(
        out,
        "<label>Description <textarea name=\"description\">{}</textarea></label>",
        escape(project.description.as_deref().unwrap_or(""))
    );
    out.push_str("<button type=\"submit\">Save</button></form>");
}
