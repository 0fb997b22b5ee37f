// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::utils::errors::NormalizeError;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

/// 不包含可读文本的元素
static NON_TEXT_SELECTOR: Lazy<Option<Selector>> =
    Lazy::new(|| Selector::parse("script, style, link, meta").ok());

static ANY_ELEMENT_SELECTOR: Lazy<Option<Selector>> =
    Lazy::new(|| Selector::parse("*").ok());

/// 页面规范化特质
pub trait PageNormalizer: Send + Sync {
    /// 将原始页面标记转换为只包含文本内容的标记
    fn normalize(&self, markup: &str) -> Result<String, NormalizeError>;
}

/// HTML 文本规范化器
///
/// 解析文档，删除 `script`、`style`、`link`、`meta` 元素以及
/// 渲染文本为空的元素，再序列化回 HTML 字符串。
/// 空白标记或删除后没有任何可读文本的页面返回 `NormalizeError::EmptyMarkup`
#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlTextNormalizer;

impl PageNormalizer for HtmlTextNormalizer {
    fn normalize(&self, markup: &str) -> Result<String, NormalizeError> {
        if markup.trim().is_empty() {
            return Err(NormalizeError::EmptyMarkup);
        }

        let mut document = Html::parse_document(markup);
        remove_matching(&mut document, NON_TEXT_SELECTOR.as_ref(), |_| true);
        if !has_readable_text(&document) {
            return Err(NormalizeError::EmptyMarkup);
        }
        remove_matching(&mut document, ANY_ELEMENT_SELECTOR.as_ref(), |element| {
            element.text().all(|text| text.trim().is_empty())
        });

        let normalized = document.html();
        debug!(
            "Normalized page from {} to {} bytes",
            markup.len(),
            normalized.len()
        );
        Ok(normalized)
    }
}

fn has_readable_text(document: &Html) -> bool {
    document
        .tree
        .root()
        .descendants()
        .filter_map(|node| node.value().as_text())
        .any(|text| !text.trim().is_empty())
}

fn remove_matching<F>(document: &mut Html, selector: Option<&Selector>, predicate: F)
where
    F: Fn(&ElementRef<'_>) -> bool,
{
    let Some(selector) = selector else {
        return;
    };

    let ids: Vec<_> = document
        .select(selector)
        .filter(|element| predicate(element))
        .map(|element| element.id())
        .collect();

    for id in ids {
        if let Some(mut node) = document.tree.get_mut(id) {
            node.detach();
        }
    }
}
