//! JavaScript evaluated in the page by the CDP driver.
//!
//! Locators are serialized to JSON and resolved in the page by the same
//! rules the in-memory driver applies: role and accessible name, deepest
//! text match, placeholder, test id, and CSS, chained step by step.

use serde::Deserialize;

use crate::driver::ElementAction;
use crate::locator::Locator;
use crate::result::E2eResult;

/// Shared helpers: role/name computation, step resolution, snapshots
const RESOLVER: &str = r#"
  const SKIP = new Set(['SCRIPT', 'STYLE', 'NOSCRIPT', 'HEAD', 'TITLE', 'TEMPLATE']);
  const HEADINGS = { H1: 1, H2: 2, H3: 3, H4: 4, H5: 5, H6: 6 };
  const norm = (s) => (s || '').replace(/\s+/g, ' ').trim();
  const roleOf = (el) => {
    const explicit = (el.getAttribute('role') || '').trim().split(/\s+/)[0];
    if (explicit) return explicit;
    if (el.tagName in HEADINGS) return 'heading';
    switch (el.tagName) {
      case 'BUTTON': return 'button';
      case 'A': return el.hasAttribute('href') ? 'link' : null;
      case 'IMG': return el.getAttribute('alt') === '' ? 'presentation' : 'img';
      case 'SELECT': return el.multiple || el.size > 1 ? 'listbox' : 'combobox';
      case 'TEXTAREA': return 'textbox';
      case 'INPUT': {
        const type = (el.getAttribute('type') || 'text').toLowerCase();
        if (type === 'checkbox') return 'checkbox';
        if (type === 'radio') return 'radio';
        if (['button', 'submit', 'reset', 'image'].includes(type)) return 'button';
        if (type === 'hidden') return null;
        if (type === 'number') return 'spinbutton';
        if (type === 'range') return 'slider';
        if (type === 'search') return 'searchbox';
        return el.hasAttribute('list') ? 'combobox' : 'textbox';
      }
      default: return null;
    }
  };
  // hidden elements are left out of the accessibility tree
  const exposed = (el) => {
    if (el.closest('[aria-hidden="true"]')) return false;
    if (el.getClientRects().length === 0) return false;
    return window.getComputedStyle(el).visibility !== 'hidden';
  };
  const levelOf = (el) => HEADINGS[el.tagName] || Number(el.getAttribute('aria-level')) || null;
  const nameOf = (el) => {
    const aria = el.getAttribute('aria-label');
    if (aria && aria.trim()) return norm(aria);
    const ids = el.getAttribute('aria-labelledby');
    if (ids) {
      return norm(ids.split(/\s+/).map((id) => {
        const ref = document.getElementById(id);
        return ref ? ref.textContent : '';
      }).join(' '));
    }
    if (el.labels && el.labels.length) {
      return norm(Array.from(el.labels).map((label) => label.textContent).join(' '));
    }
    if (el.tagName === 'IMG') return norm(el.getAttribute('alt'));
    if (el.tagName === 'INPUT' && ['button', 'submit', 'reset'].includes(el.type)) return norm(el.value);
    if (['button', 'link', 'heading'].includes(roleOf(el))) return norm(el.textContent);
    return norm(el.getAttribute('title') || el.getAttribute('placeholder'));
  };
  const textMatches = (matcher, raw) => {
    const text = norm(raw);
    if (matcher.kind === 'pattern') {
      try { return new RegExp(matcher.value).test(text); } catch (_) { return false; }
    }
    return text.toLowerCase().includes(norm(matcher.value).toLowerCase());
  };
  const within = (scope) => Array.from(scope.querySelectorAll('*')).filter((el) => !SKIP.has(el.tagName));
  const select = (scope, sel) => {
    switch (sel.kind) {
      case 'css': return Array.from(scope.querySelectorAll(sel.value));
      case 'role': return within(scope).filter((el) => {
        if (roleOf(el) !== sel.role) return false;
        if (!exposed(el)) return false;
        if (sel.level != null && levelOf(el) !== sel.level) return false;
        if (sel.name == null) return true;
        const name = nameOf(el);
        return sel.exact ? name === sel.name : name.toLowerCase().includes(sel.name.toLowerCase());
      });
      case 'text': {
        const hits = within(scope).filter((el) => textMatches(sel.matcher, el.textContent));
        return hits.filter((el) => !hits.some((other) => other !== el && el.contains(other)));
      }
      case 'placeholder': return within(scope).filter((el) =>
        (el.getAttribute('placeholder') || '').toLowerCase().includes(sel.value.toLowerCase()));
      case 'test_id': return within(scope).filter((el) => el.getAttribute('data-testid') === sel.value);
      default: throw new Error('unknown selector kind ' + sel.kind);
    }
  };
  const byDocumentOrder = (a, b) =>
    a === b ? 0 : (a.compareDocumentPosition(b) & Node.DOCUMENT_POSITION_FOLLOWING ? -1 : 1);
  const resolve = (scopes, steps) => {
    let current = scopes;
    for (const step of steps) {
      if (step.op === 'select') {
        const found = new Set();
        for (const scope of current) {
          for (const el of select(scope, step.selector)) found.add(el);
        }
        current = Array.from(found).sort(byDocumentOrder);
      } else if (step.op === 'filter_has') {
        current = current.filter((el) => resolve([el], step.inner.steps).length > 0);
      } else if (step.op === 'nth') {
        current = step.index < current.length ? [current[step.index]] : [];
      }
    }
    return current;
  };
  const visible = (el) => {
    if (!el.isConnected) return false;
    const style = window.getComputedStyle(el);
    if (style.visibility === 'hidden' || style.display === 'none') return false;
    const rect = el.getBoundingClientRect();
    return rect.width > 0 && rect.height > 0;
  };
  const snapshot = (el) => ({
    text: el.textContent || '',
    visible: visible(el),
    checked: el.type === 'checkbox' || el.type === 'radio' ? !!el.checked : null,
    value: typeof el.value === 'string' ? el.value : null,
  });
"#;

/// Apply `ACTION` to the single resolved element
const PERFORM: &str = r#"
  const found = resolve([document], STEPS);
  if (found.length !== 1) return { count: found.length, error: null, click: null };
  const el = found[0];
  const ok = (click) => ({ count: 1, error: null, click: click || null });
  const fail = (error) => ({ count: 1, error, click: null });
  const centre = () => {
    el.scrollIntoView({ block: 'center', inline: 'center' });
    const rect = el.getBoundingClientRect();
    return { x: rect.left + rect.width / 2, y: rect.top + rect.height / 2 };
  };
  const changed = () => {
    el.dispatchEvent(new Event('input', { bubbles: true }));
    el.dispatchEvent(new Event('change', { bubbles: true }));
  };
  switch (ACTION.type) {
    case 'fill': {
      if (!['INPUT', 'TEXTAREA'].includes(el.tagName)) return fail('element is not an <input> or <textarea>');
      el.focus();
      const proto = el.tagName === 'TEXTAREA' ? HTMLTextAreaElement.prototype : HTMLInputElement.prototype;
      Object.getOwnPropertyDescriptor(proto, 'value').set.call(el, ACTION.value);
      changed();
      return ok();
    }
    case 'select_option': {
      if (el.tagName !== 'SELECT') return fail('element is not a <select>');
      const options = Array.from(el.options);
      const option = options.find((o) => norm(o.label) === ACTION.value || norm(o.textContent) === ACTION.value)
        || options.find((o) => o.value === ACTION.value);
      if (!option) return fail('no option labelled ' + JSON.stringify(ACTION.value));
      el.value = option.value;
      changed();
      return ok();
    }
    case 'set_checked': {
      if (el.type !== 'checkbox' && el.type !== 'radio') return fail('element is not a checkbox or radio');
      return !!el.checked === ACTION.value ? ok() : ok(centre());
    }
    case 'click':
      return ok(centre());
    default:
      return fail('unknown action ' + ACTION.type);
  }
"#;

/// Reports document readiness and the number of resources fetched so far
pub const LOAD_STATE_PROBE: &str = "(() => ({ ready: document.readyState, \
     resources: performance.getEntriesByType('resource').length }))()";

/// Result of [`LOAD_STATE_PROBE`]
#[derive(Debug, Clone, Deserialize)]
pub struct LoadProbe {
    /// `document.readyState`
    pub ready: String,
    /// Resource entries recorded so far
    pub resources: u64,
}

/// Viewport coordinates to dispatch a mouse click at
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ClickPoint {
    pub x: f64,
    pub y: f64,
}

/// Result of an action script
#[derive(Debug, Clone, Deserialize)]
pub struct ActionOutcome {
    /// Elements the locator resolved to at action time
    pub count: usize,
    /// Why the element rejected the action
    pub error: Option<String>,
    /// Set when the action needs a real mouse click
    pub click: Option<ClickPoint>,
}

/// Expression returning an [`crate::driver::ElementState`] per match
pub fn query_script(locator: &Locator) -> E2eResult<String> {
    let steps = serde_json::to_string(locator.steps())?;
    Ok(format!(
        "(() => {{{RESOLVER}\n  return resolve([document], {steps}).map(snapshot);\n}})()"
    ))
}

/// Expression applying `action` and returning an [`ActionOutcome`]
pub fn action_script(locator: &Locator, action: &ElementAction) -> E2eResult<String> {
    let steps = serde_json::to_string(locator.steps())?;
    let action = serde_json::to_string(action)?;
    Ok(format!(
        "(() => {{{RESOLVER}\n  const STEPS = {steps};\n  const ACTION = {action};\n{PERFORM}}})()"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locator::Role;

    #[test]
    fn test_query_script_embeds_steps() {
        let locator = Locator::role(Role::Textbox).with_name("USERNAME");
        let script = query_script(&locator).unwrap();
        assert!(script.starts_with("(() => {"));
        assert!(script.ends_with("})()"));
        assert!(script.contains(r#""role":"textbox""#));
        assert!(script.contains(r#""name":"USERNAME""#));
        assert!(script.contains("map(snapshot)"));
    }

    #[test]
    fn test_action_script_embeds_action() {
        let locator = Locator::role(Role::Combobox).with_name("Exp Month");
        let script =
            action_script(&locator, &ElementAction::SelectOption("January".into())).unwrap();
        assert!(script.contains(r#"const ACTION = {"type":"select_option","value":"January"};"#));
        assert!(script.contains("const STEPS = ["));
    }

    #[test]
    fn test_role_lookup_skips_hidden_elements() {
        let script = query_script(&Locator::role(Role::Img)).unwrap();
        assert!(script.contains("if (!exposed(el)) return false;"));
        assert!(script.contains("visibility !== 'hidden'"));
    }

    #[test]
    fn test_scripts_escape_quotes() {
        let locator = Locator::text(r#"say "hi""#);
        let script = query_script(&locator).unwrap();
        assert!(script.contains(r#"say \"hi\""#));
    }

    #[test]
    fn test_action_outcome_deserializes() {
        let outcome: ActionOutcome =
            serde_json::from_str(r#"{"count":1,"error":null,"click":{"x":10.5,"y":4}}"#).unwrap();
        assert_eq!(outcome.count, 1);
        assert_eq!(outcome.click, Some(ClickPoint { x: 10.5, y: 4.0 }));
    }
}
