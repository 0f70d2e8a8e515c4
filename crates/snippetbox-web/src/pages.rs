//! Page templates. Each page renders inside the shared [`base`] layout.
//!
//! All dynamic values are HTML-escaped by maud.

use maud::{DOCTYPE, Markup, html};

use crate::forms::{EXPIRY_CHOICES, SnippetCreateForm, UserLoginForm, UserSignupForm};
use crate::templates::{PageForm, TemplateData, human_date};
use crate::validator::Validator;

fn base(title: &str, data: &TemplateData, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                title { (title) " - Snippetbox" }
                link rel="stylesheet" href="/static/css/main.css";
            }
            body {
                header {
                    h1 { a href="/" { "Snippetbox" } }
                }
                (nav(data))
                main {
                    @if let Some(flash) = &data.flash {
                        div.flash { (flash) }
                    }
                    (content)
                }
                footer {
                    "Powered by " a href="https://www.rust-lang.org/" { "Rust" } " in " (data.current_year)
                }
                script src="/static/js/main.js" type="text/javascript" {}
            }
        }
    }
}

fn nav(data: &TemplateData) -> Markup {
    html! {
        nav {
            div {
                a href="/" { "Home" }
                @if data.is_authenticated {
                    a href="/snippet/create" { "Create snippet" }
                }
            }
            div {
                @if data.is_authenticated {
                    form action="/user/logout" method="POST" {
                        (csrf_field(data))
                        button { "Logout" }
                    }
                } @else {
                    a href="/user/signup" { "Signup" }
                    a href="/user/login" { "Login" }
                }
            }
        }
    }
}

fn csrf_field(data: &TemplateData) -> Markup {
    html! {
        input type="hidden" name="csrf_token" value=(data.csrf_token);
    }
}

fn field_error(validator: &Validator, field: &str) -> Markup {
    html! {
        @if let Some(message) = validator.field_error(field) {
            label.error { (message) }
        }
    }
}

pub fn home(data: &TemplateData) -> Markup {
    let content = html! {
        h2 { "Latest Snippets" }
        @if data.snippets.is_empty() {
            p { "There's nothing to see here... yet!" }
        } @else {
            table {
                tr {
                    th { "Title" }
                    th { "Created" }
                    th { "ID" }
                }
                @for snippet in &data.snippets {
                    tr {
                        td { a href=(format!("/snippet/view/{}", snippet.id)) { (snippet.title) } }
                        td { (human_date(snippet.created)) }
                        td { "#" (snippet.id) }
                    }
                }
            }
        }
    };
    base("Home", data, content)
}

pub fn view(data: &TemplateData) -> Markup {
    let content = html! {
        @if let Some(snippet) = &data.snippet {
            div.snippet {
                div.metadata {
                    strong { (snippet.title) }
                    span { "#" (snippet.id) }
                }
                pre { code { (snippet.content) } }
                div.metadata {
                    time { "Created: " (human_date(snippet.created)) }
                    time { "Expires: " (human_date(snippet.expires)) }
                }
            }
        }
    };
    let title = data
        .snippet
        .as_ref()
        .map(|s| format!("Snippet #{}", s.id))
        .unwrap_or_else(|| "Snippet".to_string());
    base(&title, data, content)
}

pub fn create(data: &TemplateData) -> Markup {
    let form = match &data.form {
        PageForm::SnippetCreate(form) => form.clone(),
        _ => SnippetCreateForm::default(),
    };

    let content = html! {
        form action="/snippet/create" method="POST" {
            (csrf_field(data))
            div {
                label { "Title:" }
                (field_error(&form.validator, "title"))
                input type="text" name="title" value=(form.title);
            }
            div {
                label { "Content:" }
                (field_error(&form.validator, "content"))
                textarea name="content" { (form.content) }
            }
            div {
                label { "Delete in:" }
                (field_error(&form.validator, "expires"))
                @for days in EXPIRY_CHOICES.iter().rev() {
                    input type="radio" name="expires" value=(days) checked[form.expires == *days];
                    " " (expiry_label(*days)) " "
                }
            }
            div {
                input type="submit" value="Publish snippet";
            }
        }
    };
    base("Create a New Snippet", data, content)
}

fn expiry_label(days: i64) -> &'static str {
    match days {
        365 => "One Year",
        7 => "One Week",
        _ => "One Day",
    }
}

pub fn signup(data: &TemplateData) -> Markup {
    let form = match &data.form {
        PageForm::Signup(form) => form.clone(),
        _ => UserSignupForm::default(),
    };

    let content = html! {
        form action="/user/signup" method="POST" novalidate {
            (csrf_field(data))
            div {
                label { "Name:" }
                (field_error(&form.validator, "name"))
                input type="text" name="name" value=(form.name);
            }
            div {
                label { "Email:" }
                (field_error(&form.validator, "email"))
                input type="email" name="email" value=(form.email);
            }
            div {
                label { "Password:" }
                (field_error(&form.validator, "password"))
                input type="password" name="password";
            }
            div {
                input type="submit" value="Signup";
            }
        }
    };
    base("Signup", data, content)
}

pub fn login(data: &TemplateData) -> Markup {
    let form = match &data.form {
        PageForm::Login(form) => form.clone(),
        _ => UserLoginForm::default(),
    };

    let content = html! {
        form action="/user/login" method="POST" novalidate {
            (csrf_field(data))
            @for message in form.validator.non_field_errors() {
                div.error { (message) }
            }
            div {
                label { "Email:" }
                (field_error(&form.validator, "email"))
                input type="email" name="email" value=(form.email);
            }
            div {
                label { "Password:" }
                (field_error(&form.validator, "password"))
                input type="password" name="password";
            }
            div {
                input type="submit" value="Login";
            }
        }
    };
    base("Login", data, content)
}
