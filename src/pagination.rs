//! Pagination helper
//!
//! 华为云 list 接口统一使用 offset/limit 分页并在响应里携带总数
//! （`metadata.total_count` 或 `total`）。这里把"取一页、累加、到总数为止"
//! 的循环收敛成一个辅助函数，供所有 data source 使用。

use std::future::Future;

use crate::error::Result;

/// One page of a list response.
#[derive(Debug, Clone)]
pub struct Page<T> {
    /// Items in this page.
    pub items: Vec<T>,
    /// Total item count across all pages, if the API reports one.
    pub total_count: Option<u32>,
}

/// Fetch every page of a list endpoint and accumulate the items.
///
/// `fetch_page(offset, limit)` is called repeatedly; the loop stops when
/// the accumulated count reaches the reported total, a short or empty page
/// arrives, or a page returns an error (which aborts the whole listing).
pub async fn fetch_all<T, F, Fut>(page_size: u32, mut fetch_page: F) -> Result<Vec<T>>
where
    F: FnMut(u32, u32) -> Fut,
    Fut: Future<Output = Result<Page<T>>>,
{
    let limit = page_size.max(1);
    let mut all = Vec::new();

    loop {
        let page = fetch_page(all.len() as u32, limit).await?;
        let fetched = page.items.len() as u32;
        all.extend(page.items);

        // 空页或短页：没有更多数据
        if fetched == 0 || fetched < limit {
            break;
        }
        // 已达到服务端报告的总数
        if let Some(total) = page.total_count
            && all.len() as u32 >= total
        {
            break;
        }
    }

    Ok(all)
}
