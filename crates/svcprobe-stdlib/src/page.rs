//! `page` service: the site's page table

use std::any::Any;

use once_cell::sync::Lazy;
use svcprobe_sdk::{
    arg_str, opt_arg, ClassBuilder, ClassInfo, Param, Service, ServiceError, ServiceResult, Value,
};

static CLASS: Lazy<ClassInfo> = Lazy::new(|| {
    ClassBuilder::<PageService>::new()
        .constructor(&[Param::optional("pages", svcprobe_sdk::DefaultValue::Null)])
        .method("getPages", &[], |svc, _args| Ok(svc.pages()))
        .method("getPage", &[Param::required("uri")], |svc, args| {
            svc.page(&arg_str(args, 0, "uri")?)
        })
        .method(
            "getTitle",
            &[Param::required("uri"), Param::optional("fallback", "Untitled")],
            |svc, args| {
                let uri = arg_str(args, 0, "uri")?;
                let fallback = opt_arg(args, 1)
                    .and_then(Value::scalar_text)
                    .unwrap_or_else(|| "Untitled".to_string());
                Ok(Value::from(svc.title(&uri).unwrap_or(fallback)))
            },
        )
        .method("__toString", &[], |svc, _args| {
            Ok(Value::from(format!("PageService({} pages)", svc.pages.len())))
        })
        .build()
});

/// One site page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// Page URI, relative to the site root
    pub uri: String,
    /// Page title
    pub title: String,
    /// Page body
    pub content: String,
}

impl Page {
    /// Create a page
    pub fn new(uri: &str, title: &str, content: &str) -> Self {
        Self {
            uri: uri.to_string(),
            title: title.to_string(),
            content: content.to_string(),
        }
    }
}

/// Read-only table of site pages
pub struct PageService {
    pages: Vec<Page>,
}

impl PageService {
    /// Service over the default site pages
    pub fn new() -> Self {
        Self::with_pages(vec![
            Page::new("home", "Home", "Welcome to the site."),
            Page::new("about", "About Us", "Who we are."),
            Page::new("contact", "Contact", "How to reach us."),
        ])
    }

    /// Service over an explicit page list
    pub fn with_pages(pages: Vec<Page>) -> Self {
        Self { pages }
    }

    /// URI and title of every page
    pub fn pages(&self) -> Value {
        Value::List(
            self.pages
                .iter()
                .map(|p| {
                    Value::map([
                        ("uri", p.uri.as_str()),
                        ("title", p.title.as_str()),
                    ])
                })
                .collect(),
        )
    }

    /// Full page by URI; raises 404 when missing
    pub fn page(&self, uri: &str) -> ServiceResult {
        self.find(uri)
            .map(|p| {
                Value::map([
                    ("uri", p.uri.as_str()),
                    ("title", p.title.as_str()),
                    ("content", p.content.as_str()),
                ])
            })
            .ok_or_else(|| ServiceError::new(format!("No page at '{}'", uri)).with_code(404))
    }

    /// Title of a page
    pub fn title(&self, uri: &str) -> Option<String> {
        self.find(uri).map(|p| p.title.clone())
    }

    fn find(&self, uri: &str) -> Option<&Page> {
        let uri = uri.trim_matches('/');
        self.pages.iter().find(|p| p.uri == uri)
    }
}

impl Default for PageService {
    fn default() -> Self {
        Self::new()
    }
}

impl Service for PageService {
    fn class_info(&self) -> &ClassInfo {
        &CLASS
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
