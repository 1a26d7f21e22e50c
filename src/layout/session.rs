//! Layout sessions: declare, swap, refresh
//!
//! A session runs one declaration callback against proxies of the
//! participating views, turns what it declared into native constraints, and
//! swaps the resulting group in for the group it replaces.

use std::hash::Hash;

use indexmap::{IndexMap, IndexSet};

use super::config::SessionConfig;
use super::error::LayoutError;
use super::group::{refresh, ConstraintGroup, HostGroup};
use super::host::LayoutHost;
use super::proxy::{Context, LayoutProxy};
use super::storage::StorageMode;

/// One layout pass over a host
pub struct LayoutSession<'s, H: LayoutHost + ?Sized> {
    host: &'s mut H,
    config: SessionConfig,
    replacing: Option<&'s HostGroup<H>>,
}

impl<'s, H: LayoutHost + ?Sized> LayoutSession<'s, H> {
    pub fn new(host: &'s mut H, config: SessionConfig) -> Self {
        Self {
            host,
            config,
            replacing: None,
        }
    }

    /// Activate the declared constraints and refresh the participating views
    pub fn full(host: &'s mut H) -> Self {
        Self::new(host, SessionConfig::full())
    }

    /// Activate the declared constraints without refreshing
    pub fn constraints_only(host: &'s mut H) -> Self {
        Self::new(host, SessionConfig::constraints_only())
    }

    /// Swap `old` out for the declared group
    pub fn replacing(mut self, old: &'s HostGroup<H>) -> Self {
        self.replacing = Some(old);
        self
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Lay out a single view
    pub fn single<F>(self, view: H::View, declare: F) -> Result<HostGroup<H>, LayoutError>
    where
        F: FnOnce(LayoutProxy<'_, H>),
    {
        self.run(vec![view], |context| declare(LayoutProxy::new(context, view)))
    }

    pub fn pair<F>(self, a: H::View, b: H::View, declare: F) -> Result<HostGroup<H>, LayoutError>
    where
        F: FnOnce(LayoutProxy<'_, H>, LayoutProxy<'_, H>),
    {
        self.run(vec![a, b], |context| {
            declare(LayoutProxy::new(context, a), LayoutProxy::new(context, b))
        })
    }

    pub fn triple<F>(
        self,
        a: H::View,
        b: H::View,
        c: H::View,
        declare: F,
    ) -> Result<HostGroup<H>, LayoutError>
    where
        F: FnOnce(LayoutProxy<'_, H>, LayoutProxy<'_, H>, LayoutProxy<'_, H>),
    {
        self.run(vec![a, b, c], |context| {
            declare(
                LayoutProxy::new(context, a),
                LayoutProxy::new(context, b),
                LayoutProxy::new(context, c),
            )
        })
    }

    /// Lay out an ordered collection of views; proxies keep the input order
    pub fn each<F>(self, views: &[H::View], declare: F) -> Result<HostGroup<H>, LayoutError>
    where
        F: FnOnce(&[LayoutProxy<'_, H>]),
    {
        self.run(views.to_vec(), |context| {
            let proxies: Vec<_> = views
                .iter()
                .map(|&view| LayoutProxy::new(context, view))
                .collect();
            declare(&proxies)
        })
    }

    /// Lay out a keyed collection of views, such as a `HashMap<K, View>`
    pub fn keyed<'m, K, M, F>(self, views: M, declare: F) -> Result<HostGroup<H>, LayoutError>
    where
        K: Clone + Eq + Hash + 'm,
        H::View: 'm,
        M: IntoIterator<Item = (&'m K, &'m H::View)>,
        F: FnOnce(&IndexMap<K, LayoutProxy<'_, H>>),
    {
        let views: IndexMap<K, H::View> = views
            .into_iter()
            .map(|(key, &view)| (key.clone(), view))
            .collect();
        let participants = views.values().copied().collect();
        self.run(participants, |context| {
            let proxies: IndexMap<_, _> = views
                .iter()
                .map(|(key, &view)| (key.clone(), LayoutProxy::new(context, view)))
                .collect();
            declare(&proxies)
        })
    }

    fn run<F>(self, views: Vec<H::View>, declare: F) -> Result<HostGroup<H>, LayoutError>
    where
        F: for<'c> FnOnce(&'c Context<'c, H>),
    {
        let LayoutSession {
            host,
            config,
            replacing,
        } = self;

        let mode = StorageMode::resolve(&*host, config.storage_mode)?;
        let requests = {
            let context = Context::new(&*host);
            declare(&context);
            context.into_requests()
        };
        log::debug!(
            "layout session: {} constraint(s) over {} view(s), mode={}, perform_layout={}",
            requests.len(),
            views.len(),
            mode.name(),
            config.perform_layout
        );

        let mut group = ConstraintGroup::with_mode(mode);
        group.reserve(requests.len());
        let mut created = Vec::with_capacity(requests.len());
        for spec in requests {
            let constraint = host.create_constraint(spec);
            created.push(constraint);
            if let Err(err) = group.append(&*host, constraint) {
                log::debug!(
                    "layout session failed, returning {} constraint(s) to the host",
                    created.len()
                );
                for constraint in created {
                    host.remove_constraint(constraint);
                }
                return Err(err);
            }
        }

        if let Some(old) = replacing {
            old.set_active(host, false);
        }
        group.set_active(host, true);

        if config.perform_layout {
            let mut targets = replacing
                .map(|old| old.refresh_targets(&*host))
                .unwrap_or_default();
            targets.extend(views);
            refresh(host, targets);
        }
        Ok(group)
    }
}

/// Lay out one view: activate what `declare` produces and refresh
pub fn layout<H, F>(host: &mut H, view: H::View, declare: F) -> Result<HostGroup<H>, LayoutError>
where
    H: LayoutHost + ?Sized,
    F: FnOnce(LayoutProxy<'_, H>),
{
    LayoutSession::full(host).single(view, declare)
}

/// Constrain one view: activate what `declare` produces without refreshing
pub fn constrain<H, F>(
    host: &mut H,
    view: H::View,
    declare: F,
) -> Result<HostGroup<H>, LayoutError>
where
    H: LayoutHost + ?Sized,
    F: FnOnce(LayoutProxy<'_, H>),
{
    LayoutSession::constraints_only(host).single(view, declare)
}

/// Deactivate a group and refresh the views it affected
pub fn clear_layout<H>(host: &mut H, group: &HostGroup<H>)
where
    H: LayoutHost + ?Sized,
{
    group.deactivate(host, true);
}

/// Deactivate a group without refreshing
pub fn clear_constraints<H>(host: &mut H, group: &HostGroup<H>)
where
    H: LayoutHost + ?Sized,
{
    group.deactivate(host, false);
}

/// Swap `old` for `new` in one step.
///
/// Both toggles happen before any refresh, so no refresh runs against a tree
/// holding neither group. Refresh targets are the old group's views followed
/// by the new group's, deduplicated.
pub fn replace<H>(host: &mut H, old: &HostGroup<H>, new: &HostGroup<H>, perform_layout: bool)
where
    H: LayoutHost + ?Sized,
{
    old.set_active(host, false);
    new.set_active(host, true);
    if perform_layout {
        let mut targets: IndexSet<H::View> = old.refresh_targets(&*host);
        targets.extend(new.refresh_targets(&*host));
        refresh(host, targets);
    }
}
