//! 時間予算付きイテレータ

use std::time::{Duration, Instant};

/// 経過時間が予算を超えたら列挙を打ち切るイテレータアダプタ
///
/// 少なくとも1要素は必ず返す。打ち切った時点で残りがあれば `truncated` になる。
#[derive(Debug)]
pub struct Budgeted<I> {
    inner: I,
    started_at: Instant,
    budget: Duration,
    yielded: bool,
    stopped: bool,
    truncated: bool,
}

impl<I: Iterator> Budgeted<I> {
    pub fn new(inner: I, started_at: Instant, budget: Duration) -> Self {
        Self {
            inner,
            started_at,
            budget,
            yielded: false,
            stopped: false,
            truncated: false,
        }
    }

    /// 予算切れで打ち切られたか
    pub fn truncated(&self) -> bool {
        self.truncated
    }
}

impl<I: Iterator> Iterator for Budgeted<I> {
    type Item = I::Item;

    fn next(&mut self) -> Option<Self::Item> {
        if self.stopped {
            return None;
        }

        if self.yielded && self.started_at.elapsed() >= self.budget {
            self.stopped = true;
            self.truncated = self.inner.next().is_some();
            if self.truncated {
                log::debug!("listing stopped after {:?}", self.budget);
            }
            return None;
        }

        let item = self.inner.next()?;
        self.yielded = true;
        Some(item)
    }
}
