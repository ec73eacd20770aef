//! Property Reconciler - per-node property delta.
//!
//! Computes and applies the difference between an old and new prop set on
//! one host node. Unchanged values are skipped, but re-assigning an
//! unchanged value must be harmless: the skip is a relaxation, not a
//! contract the host may rely on.
//!
//! Three key classes get special treatment:
//! - `style` - diffed sub-property by sub-property, so a partial style
//!   update never clobbers unrelated sub-properties
//! - `on*` (uppercase-initial event name) - delegated to the event
//!   registry under the lowercased event name, never written to the host
//! - everything else - a generic host property write

use tracing::trace;

use super::Engine;
use crate::host::{EventRegistry, HostAdapter};
use crate::types::{NodeId, PropValue, Props};

/// Match the `on` + uppercase-initial event handler naming convention.
/// "onClick" yields "click"; "once" or "on" are ordinary props.
pub(crate) fn handler_event(key: &str) -> Option<String> {
    let rest = key.strip_prefix("on")?;
    let first = rest.chars().next()?;
    if !first.is_ascii_uppercase() {
        return None;
    }
    Some(rest.to_ascii_lowercase())
}

impl<H: HostAdapter + 'static, E: EventRegistry + 'static> Engine<H, E> {
    /// Apply the property delta between `old` and `new` to `node`.
    ///
    /// `old` is `None` on first mount and treated as empty. Keys present in
    /// `old` but absent from `new` are cleared: handlers are unregistered,
    /// style sub-properties cleared individually, everything else written
    /// as [`PropValue::Null`]. A handler-named key whose value class flips
    /// between handler and non-handler releases the stale side first.
    pub fn apply_props(&self, node: NodeId, old: Option<&Props>, new: &Props) {
        let empty = Props::new();
        let old = old.unwrap_or(&empty);

        for (key, value) in new {
            let previous = old.get(key);
            if previous == Some(value) {
                continue;
            }
            trace!(%node, %key, "set prop");
            if key == "style" {
                self.apply_style(node, previous, value);
            } else if let Some(event) = handler_event(key) {
                // A handler-named key may flip value class between renders;
                // the stale side must be released, not just overwritten.
                match value {
                    PropValue::Handler(handler) => {
                        if previous.is_some_and(|p| !matches!(p, PropValue::Handler(_))) {
                            self.host().set_property(node, key, &PropValue::Null);
                        }
                        self.events().register(node, &event, handler.clone());
                    }
                    other => {
                        if matches!(previous, Some(PropValue::Handler(_))) {
                            self.events().unregister(node, &event);
                        }
                        self.host().set_property(node, key, other);
                    }
                }
            } else {
                self.host().set_property(node, key, value);
            }
        }

        for (key, value) in old {
            if new.contains_key(key) {
                continue;
            }
            trace!(%node, %key, "clear prop");
            if key == "style" {
                if let PropValue::Style(styles) = value {
                    for style_key in styles.keys() {
                        self.host().set_style_property(node, style_key, "");
                    }
                }
            } else if let (Some(event), PropValue::Handler(_)) = (handler_event(key), value) {
                self.events().unregister(node, &event);
            } else {
                self.host().set_property(node, key, &PropValue::Null);
            }
        }
    }

    /// Apply one `style` prop: write changed sub-properties, clear the ones
    /// the new map dropped. A non-style value under the `style` key falls
    /// back to a generic property write.
    fn apply_style(&self, node: NodeId, previous: Option<&PropValue>, value: &PropValue) {
        let old_styles = match previous {
            Some(PropValue::Style(map)) => Some(map),
            _ => None,
        };
        match value {
            PropValue::Style(new_styles) => {
                for (style_key, style_value) in new_styles {
                    if old_styles.and_then(|map| map.get(style_key)) == Some(style_value) {
                        continue;
                    }
                    self.host().set_style_property(node, style_key, style_value);
                }
                if let Some(old_styles) = old_styles {
                    for style_key in old_styles.keys() {
                        if !new_styles.contains_key(style_key) {
                            self.host().set_style_property(node, style_key, "");
                        }
                    }
                }
            }
            other => self.host().set_property(node, "style", other),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
