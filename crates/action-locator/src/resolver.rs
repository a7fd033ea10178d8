//! Element resolver: candidate race, pierce chains and match unions

use async_trait::async_trait;
use futures::future::{select_ok, BoxFuture, FutureExt};
use replay_core_types::{describe_selectors, SelectorChain};
use replay_primitives::{
    bounded, Element, ElementRef, FrameRef, Queryable, WaitForSelectorOptions,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::debug;

use crate::errors::LocatorError;

/// Deadline and visibility requirement for one resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Zero means no deadline
    pub timeout: Duration,
    pub visible: bool,
}

impl ResolveOptions {
    pub fn new(timeout: Duration, visible: bool) -> Self {
        Self { timeout, visible }
    }
}

/// Element resolver trait
#[async_trait]
pub trait ElementResolver: Send + Sync {
    /// Race every chain; the first to resolve wins and the rest are dropped
    async fn resolve_one(
        &self,
        frame: &FrameRef,
        selectors: &[SelectorChain],
        options: ResolveOptions,
    ) -> Result<ElementRef, LocatorError>;

    /// Every current match of every chain, concatenated in chain order
    async fn resolve_all(
        &self,
        frame: &FrameRef,
        selectors: &[SelectorChain],
        options: ResolveOptions,
    ) -> Result<Vec<ElementRef>, LocatorError>;
}

/// Default element resolver implementation
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultElementResolver;

impl DefaultElementResolver {
    pub fn new() -> Self {
        Self
    }
}

fn ensure_selectors(selectors: &[SelectorChain]) -> Result<(), LocatorError> {
    if selectors.is_empty() || selectors.iter().any(SelectorChain::is_empty) {
        return Err(LocatorError::EmptySelectors);
    }
    Ok(())
}

/// Wait for each hop inside the previous hop's element.
///
/// Intermediate hops are shadow hosts or iframe owners, so visibility is only
/// required of the final hop.
async fn wait_for_chain(
    frame: &FrameRef,
    chain: &SelectorChain,
    options: ResolveOptions,
) -> Result<ElementRef, LocatorError> {
    let hops = chain.hops();
    let last = hops.len().saturating_sub(1);
    let mut current: Option<ElementRef> = None;

    for (index, selector) in hops.iter().enumerate() {
        let wait = WaitForSelectorOptions::new(options.timeout, options.visible && index == last);
        let found = match &current {
            None => frame.wait_for_selector(selector, wait).await,
            Some(parent) => parent.wait_for_selector(selector, wait).await,
        };
        match found {
            Ok(element) => {
                debug!(hop = index, selector = %selector, "Hop resolved");
                current = Some(element);
            }
            Err(e) if e.is_timeout() => {
                debug!(hop = index, selector = %selector, "Hop timed out");
                return Err(LocatorError::SelectorNotFound(chain.to_string()));
            }
            Err(e) => return Err(e.into()),
        }
    }

    current.ok_or(LocatorError::EmptySelectors)
}

/// Query each hop under every element matched by the previous hop
async fn query_chain(frame: &FrameRef, chain: &SelectorChain) -> Result<Vec<ElementRef>, LocatorError> {
    let (first, rest) = chain
        .hops()
        .split_first()
        .ok_or(LocatorError::EmptySelectors)?;

    let mut current = frame.query_all(first).await?;
    for selector in rest {
        if current.is_empty() {
            break;
        }
        let mut next = Vec::new();
        for parent in &current {
            next.extend(parent.query_all(selector).await?);
        }
        current = next;
    }
    Ok(current)
}

#[async_trait]
impl ElementResolver for DefaultElementResolver {
    async fn resolve_one(
        &self,
        frame: &FrameRef,
        selectors: &[SelectorChain],
        options: ResolveOptions,
    ) -> Result<ElementRef, LocatorError> {
        ensure_selectors(selectors)?;

        let timed_out = AtomicBool::new(false);
        let attempts: Vec<BoxFuture<'_, Result<ElementRef, LocatorError>>> = selectors
            .iter()
            .enumerate()
            .map(|(index, chain)| {
                let timed_out = &timed_out;
                async move {
                    let element = match wait_for_chain(frame, chain, options).await {
                        Ok(element) => element,
                        Err(e) => {
                            if e.is_timeout() {
                                timed_out.store(true, Ordering::Relaxed);
                            }
                            return Err(e);
                        }
                    };
                    debug!(chain_index = index, chain = %chain, "Chain won the race");
                    Ok(element)
                }
                .boxed()
            })
            .collect();

        // select_ok scans in declaration order, so among chains ready in the
        // same poll the first declared wins. Losers drop with the remainder.
        // Its error is whichever chain failed last; any timed-out chain makes
        // the whole race a miss.
        let result = match bounded(options.timeout, select_ok(attempts)).await {
            Some(Ok((element, _losers))) => Ok(element),
            Some(Err(e)) if !e.is_timeout() && !timed_out.load(Ordering::Relaxed) => Err(e),
            Some(Err(_)) | None => Err(LocatorError::SelectorNotFound(describe_selectors(
                selectors,
            ))),
        };
        result
    }

    async fn resolve_all(
        &self,
        frame: &FrameRef,
        selectors: &[SelectorChain],
        options: ResolveOptions,
    ) -> Result<Vec<ElementRef>, LocatorError> {
        ensure_selectors(selectors)?;

        let collect = async {
            let mut matches = Vec::new();
            for chain in selectors {
                let found = query_chain(frame, chain).await?;
                debug!(chain = %chain, matched = found.len(), "Chain queried");
                matches.extend(found);
            }

            if !options.visible {
                return Ok::<_, LocatorError>(matches);
            }
            let mut visible = Vec::with_capacity(matches.len());
            for element in matches {
                if element.is_visible().await? {
                    visible.push(element);
                }
            }
            Ok(visible)
        };

        bounded(options.timeout, collect).await.unwrap_or_else(|| {
            Err(LocatorError::Timeout(format!(
                "querying selectors: {}",
                describe_selectors(selectors)
            )))
        })
    }
}
