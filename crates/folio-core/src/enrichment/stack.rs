//! Technology stack detection from dependency manifests.
//!
//! Two manifests are fetched by fixed path: `package.json` contributes its
//! runtime and development dependency names (one per line), and
//! `requirements.txt` contributes its lower-cased text. Each entry of the
//! pattern table is run against that text in order; a match appends the tag
//! to its category once.

use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;
use tracing::{debug, warn};

use crate::client::HostingApi;
use crate::error::{Error, Result};
use crate::types::{ProjectStack, StackCategory};

pub const PACKAGE_JSON: &str = "package.json";
pub const REQUIREMENTS_TXT: &str = "requirements.txt";

/// One row of the detection table
pub struct StackPattern {
    pub tag: &'static str,
    pub category: StackCategory,
    matcher: Regex,
}

impl StackPattern {
    fn new(tag: &'static str, category: StackCategory, names: &str) -> Self {
        // A dependency name at line start, followed by the end of the name
        let pattern = format!(r"(?m)^\s*(?:{})(?:$|[^a-z0-9_.\-/])", names);
        Self {
            tag,
            category,
            matcher: Regex::new(&pattern).expect("static stack pattern"),
        }
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.matcher.is_match(text)
    }
}

static STACK_PATTERNS: LazyLock<Vec<StackPattern>> = LazyLock::new(|| {
    use StackCategory::*;

    vec![
        // Frameworks
        StackPattern::new("react", Frameworks, "react"),
        StackPattern::new("next", Frameworks, "next"),
        StackPattern::new("vue", Frameworks, "vue"),
        StackPattern::new("nuxt", Frameworks, "nuxt"),
        StackPattern::new("svelte", Frameworks, r"svelte|@sveltejs/kit"),
        StackPattern::new("angular", Frameworks, r"@angular/core"),
        StackPattern::new("express", Frameworks, "express"),
        StackPattern::new("fastify", Frameworks, "fastify"),
        StackPattern::new("nestjs", Frameworks, r"@nestjs/core"),
        StackPattern::new("django", Frameworks, "django"),
        StackPattern::new("flask", Frameworks, "flask"),
        StackPattern::new("fastapi", Frameworks, "fastapi"),
        // Databases
        StackPattern::new("postgres", Databases, r"pg|postgres|psycopg2?(?:-binary)?|asyncpg"),
        StackPattern::new("mysql", Databases, r"mysql2?|pymysql|mysqlclient"),
        StackPattern::new("mongodb", Databases, r"mongodb|mongoose|pymongo"),
        StackPattern::new("redis", Databases, r"redis|ioredis"),
        StackPattern::new("sqlite", Databases, r"sqlite3?|better-sqlite3"),
        StackPattern::new("prisma", Databases, r"prisma|@prisma/client"),
        StackPattern::new("drizzle", Databases, r"drizzle-orm"),
        StackPattern::new("supabase", Databases, r"supabase|@supabase/supabase-js"),
        // Auth
        StackPattern::new("next-auth", Auth, r"next-auth|@auth/core"),
        StackPattern::new("passport", Auth, "passport"),
        StackPattern::new("auth0", Auth, r"auth0|@auth0/[a-z0-9\-]+"),
        StackPattern::new("clerk", Auth, r"@clerk/[a-z0-9\-]+"),
        StackPattern::new("jwt", Auth, r"jsonwebtoken|jose|pyjwt"),
        StackPattern::new("firebase-auth", Auth, r"firebase|firebase-admin"),
        // Infra
        StackPattern::new("aws-sdk", Infra, r"aws-sdk|@aws-sdk/[a-z0-9\-]+|boto3"),
        StackPattern::new("vercel", Infra, r"vercel|@vercel/[a-z0-9\-]+"),
        StackPattern::new("docker", Infra, r"dockerode|docker"),
        StackPattern::new("kubernetes", Infra, r"kubernetes|@kubernetes/client-node"),
        StackPattern::new("terraform", Infra, r"cdktf|python-terraform"),
        StackPattern::new("cloudflare", Infra, r"wrangler|@cloudflare/[a-z0-9\-]+"),
        // Testing
        StackPattern::new("jest", Testing, "jest"),
        StackPattern::new("vitest", Testing, "vitest"),
        StackPattern::new("mocha", Testing, "mocha"),
        StackPattern::new("cypress", Testing, "cypress"),
        StackPattern::new("playwright", Testing, r"playwright|@playwright/test"),
        StackPattern::new("pytest", Testing, "pytest"),
        StackPattern::new("testing-library", Testing, r"@testing-library/[a-z0-9\-]+"),
        // Other
        StackPattern::new("typescript", Other, "typescript"),
        StackPattern::new("tailwindcss", Other, "tailwindcss"),
        StackPattern::new("graphql", Other, r"graphql|graphene"),
        StackPattern::new("trpc", Other, r"@trpc/server|@trpc/client"),
        StackPattern::new("zod", Other, "zod"),
        StackPattern::new("celery", Other, "celery"),
        StackPattern::new("pandas", Other, "pandas"),
        StackPattern::new("numpy", Other, "numpy"),
    ]
});

/// The ordered detection table
pub fn stack_patterns() -> &'static [StackPattern] {
    &STACK_PATTERNS
}

/// Run the table against `text`, adding every matching tag to `stack`.
pub fn apply_patterns(text: &str, stack: &mut ProjectStack) {
    for pattern in stack_patterns() {
        if pattern.is_match(text) {
            stack.add(pattern.category, pattern.tag);
        }
    }
}

/// Dependency and devDependency names of a `package.json`, one per line.
pub fn package_json_search_text(raw: &str) -> Result<String> {
    let manifest: Value =
        serde_json::from_str(raw).map_err(|e| Error::manifest(PACKAGE_JSON, e.to_string()))?;

    let names: Vec<&str> = ["dependencies", "devDependencies"]
        .iter()
        .filter_map(|section| manifest.get(section).and_then(Value::as_object))
        .flat_map(|deps| deps.keys().map(String::as_str))
        .collect();

    Ok(names.join("\n"))
}

/// Lower-cased requirements text
pub fn requirements_search_text(raw: &str) -> String {
    raw.to_lowercase()
}

/// Detect a stack from manifest contents already in hand. A manifest that
/// fails to parse contributes nothing; the other is still used.
pub fn detect_stack_from_manifests(
    package_json: Option<&str>,
    requirements: Option<&str>,
) -> ProjectStack {
    let mut stack = ProjectStack::default();

    if let Some(raw) = package_json {
        match package_json_search_text(raw) {
            Ok(text) => apply_patterns(&text, &mut stack),
            Err(e) => warn!(error = %e, "Skipping unparseable manifest"),
        }
    }

    if let Some(raw) = requirements {
        apply_patterns(&requirements_search_text(raw), &mut stack);
    }

    stack
}

/// Fetch both manifests concurrently and detect the stack.
pub async fn detect_stack(api: &dyn HostingApi, owner: &str, name: &str) -> ProjectStack {
    let (package_json, requirements) = tokio::join!(
        api.get_file_content(owner, name, PACKAGE_JSON),
        api.get_file_content(owner, name, REQUIREMENTS_TXT),
    );

    let stack = detect_stack_from_manifests(package_json.as_deref(), requirements.as_deref());
    debug!(owner = %owner, repo = %name, empty = stack.is_empty(), "Detected stack");
    stack
}
