//! Profile rendering
//!
//! Turns each discovered Account into a block of `~/.aws/config` text using
//! the user's template. The template sees the Account's fields (`id`,
//! `alias`, `status`, `joined_at`, `tags`) and can call
//! `has_tag_key_value tags "<key>" "<value>"`.

use aliased_core::{Account, Tag};
use anyhow::{Context, Result};
use handlebars::{
    Context as RenderData, Handlebars, Helper, HelperDef, RenderContext, RenderError,
    RenderErrorReason, ScopedJson,
};
use serde_json::Value as Json;

/// Template written by `init`
pub const DEFAULT_TEMPLATE: &str = r#"{{#*inline "profileBody"}}
cli_pager=
source_profile = default
{{#if (has_tag_key_value tags "environment" "staging")}}
role_arn = arn:aws:iam::{{id}}:role/Staging
{{else}}
role_arn = arn:aws:iam::{{id}}:role/Production
{{/if}}
{{/inline}}
[profile {{id}}]
{{> profileBody}}
{{#if alias}}
[profile {{alias}}]
{{> profileBody}}
{{/if}}
"#;

const TEMPLATE_NAME: &str = "profile";

/// Renders one Account into config text
pub trait ProfileRenderer {
    fn render(&self, account: &Account) -> Result<String>;
}

const TAG_HELPER: &str = "has_tag_key_value";

/// `has_tag_key_value tags key value`
///
/// Fails the render when `tags` is not a list of `{key, value}` pairs.
struct HasTagKeyValue;

impl HelperDef for HasTagKeyValue {
    fn call_inner<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        _: &'reg Handlebars<'reg>,
        _: &'rc RenderData,
        _: &mut RenderContext<'reg, 'rc>,
    ) -> std::result::Result<ScopedJson<'rc>, RenderError> {
        let tags = h
            .param(0)
            .ok_or(RenderErrorReason::ParamNotFoundForIndex(TAG_HELPER, 0))?;
        let tags: Vec<Tag> = serde_json::from_value(tags.value().clone()).map_err(|e| {
            RenderErrorReason::ParamTypeMismatchForName(
                TAG_HELPER,
                "tags".to_string(),
                format!("list of key/value tags ({})", e),
            )
        })?;
        let key = str_param(h, 1, "key")?;
        let value = str_param(h, 2, "value")?;

        Ok(ScopedJson::Derived(Json::Bool(Tag::any_matches(
            &tags, key, value,
        ))))
    }
}

fn str_param<'a>(
    h: &'a Helper<'_>,
    index: usize,
    name: &str,
) -> std::result::Result<&'a str, RenderError> {
    let param = h
        .param(index)
        .ok_or(RenderErrorReason::ParamNotFoundForIndex(TAG_HELPER, index))?;
    param.value().as_str().ok_or_else(|| {
        RenderErrorReason::ParamTypeMismatchForName(
            TAG_HELPER,
            name.to_string(),
            "string".to_string(),
        )
        .into()
    })
}

/// Handlebars implementation of [`ProfileRenderer`]
pub struct HandlebarsRenderer {
    handlebars: Handlebars<'static>,
}

impl HandlebarsRenderer {
    /// Compiles `template`; fails on syntax errors
    pub fn new(template: &str) -> Result<Self> {
        let mut handlebars = Handlebars::new();

        // Config files are plain text
        handlebars.register_escape_fn(handlebars::no_escape);
        handlebars.register_helper(TAG_HELPER, Box::new(HasTagKeyValue));
        handlebars
            .register_template_string(TEMPLATE_NAME, template)
            .context("Failed to parse the profile template")?;

        Ok(Self { handlebars })
    }

    /// Renders every account, one block per line group
    pub fn render_all(&self, accounts: &[Account]) -> Result<String> {
        let mut out = String::new();
        for account in accounts {
            out.push_str(&self.render(account)?);
            out.push('\n');
        }
        Ok(out)
    }
}

impl ProfileRenderer for HandlebarsRenderer {
    fn render(&self, account: &Account) -> Result<String> {
        self.handlebars
            .render(TEMPLATE_NAME, account)
            .with_context(|| format!("Failed to render the profile of account {}", account.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aliased_core::AccountId;
    use chrono::{TimeZone, Utc};

    fn account(id: &str, alias: &str, tags: Vec<Tag>) -> Account {
        let mut account = Account::seed(
            AccountId::parse(id).unwrap(),
            Utc.with_ymd_and_hms(2021, 3, 4, 5, 6, 7).unwrap(),
            "ACTIVE",
        );
        account.alias = alias.to_string();
        account.tags = tags;
        account
    }

    #[test]
    fn test_default_template_staging() {
        let renderer = HandlebarsRenderer::new(DEFAULT_TEMPLATE).unwrap();
        let out = renderer
            .render(&account(
                "000000000001",
                "acme-staging",
                vec![Tag::new("environment", "staging")],
            ))
            .unwrap();

        assert!(out.contains("[profile 000000000001]"));
        assert!(out.contains("[profile acme-staging]"));
        assert!(out.contains("role_arn = arn:aws:iam::000000000001:role/Staging"));
        assert!(!out.contains("role/Production"));
        assert_eq!(out.matches("source_profile = default").count(), 2);
    }

    #[test]
    fn test_default_template_without_alias() {
        let renderer = HandlebarsRenderer::new(DEFAULT_TEMPLATE).unwrap();
        let out = renderer
            .render(&account("000000000002", "", vec![Tag::new("environment", "prod")]))
            .unwrap();

        assert!(out.contains("[profile 000000000002]"));
        assert_eq!(out.matches("[profile").count(), 1);
        assert!(out.contains("role_arn = arn:aws:iam::000000000002:role/Production"));
    }

    #[test]
    fn test_tag_match_is_exact() {
        let renderer = HandlebarsRenderer::new(
            r#"{{#if (has_tag_key_value tags "Environment" "staging")}}yes{{else}}no{{/if}}"#,
        )
        .unwrap();

        let out = renderer
            .render(&account("000000000001", "", vec![Tag::new("environment", "staging")]))
            .unwrap();
        assert_eq!(out, "no");
    }

    #[test]
    fn test_tag_helper_rejects_non_tag_argument() {
        let renderer = HandlebarsRenderer::new(
            r#"{{#if (has_tag_key_value id "environment" "staging")}}yes{{else}}no{{/if}}"#,
        )
        .unwrap();

        let err = renderer
            .render(&account("000000000001", "", vec![Tag::new("environment", "staging")]))
            .unwrap_err();
        assert!(format!("{:#}", err).contains("000000000001"));
    }

    #[test]
    fn test_tag_helper_requires_string_key() {
        let renderer =
            HandlebarsRenderer::new(r#"{{#if (has_tag_key_value tags 1 "staging")}}yes{{/if}}"#)
                .unwrap();
        assert!(renderer.render(&account("000000000001", "", vec![])).is_err());
    }

    #[test]
    fn test_values_are_not_escaped() {
        let renderer = HandlebarsRenderer::new("{{tags.[0].value}}").unwrap();
        let out = renderer
            .render(&account("000000000001", "", vec![Tag::new("owner", "a&b <ops>")]))
            .unwrap();
        assert_eq!(out, "a&b <ops>");
    }

    #[test]
    fn test_render_all_joins_with_newlines() {
        let renderer = HandlebarsRenderer::new("[profile {{id}}]").unwrap();
        let out = renderer
            .render_all(&[
                account("000000000001", "", vec![]),
                account("000000000002", "", vec![]),
            ])
            .unwrap();
        assert_eq!(out, "[profile 000000000001]\n[profile 000000000002]\n");
    }

    #[test]
    fn test_syntax_error_is_reported() {
        assert!(HandlebarsRenderer::new("{{#if alias}}unclosed").is_err());
    }
}
