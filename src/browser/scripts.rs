//! Page-side scripts for the DevTools driver.
//!
//! Every script is a self-contained expression. Arguments are embedded as
//! JSON, never spliced in as raw text. Scripts that navigate mark the
//! affected windows, schedule the navigation and return first so the
//! evaluation can complete; [`page_state`] reports when it has landed.

use serde::Deserialize;
use serde_json::{json, Value};

use super::idle::NAVIGATION_GRACE;
use super::{LinkMatch, PageScript, SelectorSpec};

/// Helpers shared by every script: depth-first frame list, text
/// normalization, visibility and selector lookup.
const PRELUDE: &str = r#"
const __frames = [];
const __walk = (win) => {
  __frames.push(win);
  let count = 0;
  try { count = win.frames.length; } catch (e) { count = 0; }
  for (let i = 0; i < count; i++) __walk(win.frames[i]);
};
__walk(window);
const __doc = (index) => {
  const win = __frames[index];
  if (!win) throw new Error(`frame ${index} is gone`);
  return win.document;
};
const __normalize = (s) => (s || "").replace(/\s+/g, " ").trim();
const __text = (el) => __normalize(el.innerText || el.textContent || "");
const __visible = (el) => {
  const view = el.ownerDocument.defaultView;
  const style = view ? view.getComputedStyle(el) : null;
  if (style && (style.visibility === "hidden" || style.display === "none")) return false;
  return el.getClientRects().length > 0;
};
const __find = (doc, spec) => {
  let nodes;
  try { nodes = Array.from(doc.querySelectorAll(spec.css)); } catch (e) { return []; }
  if (spec.text) nodes = nodes.filter((n) => __text(n).includes(spec.text));
  return nodes;
};
const __markPending = (win) => {
  for (const w of new Set([win || window, window])) {
    try {
      w.__sminfoPending = Date.now();
      w.addEventListener("beforeunload", () => { w.__sminfoPending = "leaving"; }, { once: true });
    } catch (e) {}
  }
};
const __element = (frame, spec) => {
  const el = __find(__doc(frame), spec)[0];
  if (!el) throw new Error(`no element for ${spec.raw} in frame ${frame}`);
  return el;
};
"#;

const SNAPSHOT: &str = r#"
return __frames.map((win, index) => {
  let url = "";
  try { url = win.location.href; } catch (e) { url = ""; }
  try {
    const doc = win.document;
    doc.querySelectorAll("input").forEach((input) => {
      if (input.type !== "password") input.setAttribute("value", input.value || "");
    });
    return { index, url, html: doc.documentElement.outerHTML, error: null };
  } catch (e) {
    return { index, url, html: null, error: String(e) };
  }
});
"#;

const LOCATE: &str = r#"
for (let frame = 0; frame < __frames.length; frame++) {
  let doc;
  try { doc = __frames[frame].document; } catch (e) { continue; }
  for (let position = 0; position < args.selectors.length; position++) {
    const el = __find(doc, args.selectors[position])[0];
    try {
      if (el && __visible(el)) return { frame, position };
    } catch (e) {
      continue;
    }
  }
}
return null;
"#;

const FILL: &str = r#"
const el = __element(args.frame, args.spec);
el.focus();
el.value = args.value;
el.dispatchEvent(new Event("input", { bubbles: true }));
el.dispatchEvent(new Event("change", { bubbles: true }));
return true;
"#;

const FOCUS: &str = r#"
const el = __element(args.frame, args.spec);
__markPending(el.ownerDocument.defaultView);
el.focus();
return true;
"#;

const CLICK: &str = r#"
const el = __element(args.frame, args.spec);
__markPending(el.ownerDocument.defaultView);
setTimeout(() => el.click(), 0);
return true;
"#;

const CLICK_LINK: &str = r#"
const target = __normalize(args.text);
if (!target) return false;
for (let frame = 0; frame < __frames.length; frame++) {
  let doc;
  try { doc = __frames[frame].document; } catch (e) { continue; }
  const anchors = Array.from(doc.querySelectorAll("a"));
  let hit = null;
  if (args.how === "role") {
    hit = Array.from(doc.querySelectorAll("a[href], [role='link']"))
      .find((el) => __text(el) === target);
  } else if (args.how === "contains") {
    hit = anchors.find((el) => __text(el).includes(target));
  } else {
    hit = anchors.find((el) => __text(el) === target)
      || anchors.find((el) => __text(el).includes(target));
  }
  if (hit) {
    __markPending(hit.ownerDocument.defaultView);
    setTimeout(() => hit.click(), 0);
    return true;
  }
}
return false;
"#;

const POST_FORM: &str = r#"
const form = document.createElement("form");
form.method = "POST";
form.action = args.action;
for (const [name, value] of args.fields) {
  const input = document.createElement("input");
  input.type = "hidden";
  input.name = name;
  input.value = value;
  form.appendChild(input);
}
(document.body || document.documentElement).appendChild(form);
__markPending(window);
setTimeout(() => form.submit(), 0);
return true;
"#;

const SUBMIT_SEARCH: &str = r#"
const form = document.forms["search"] || document.querySelector("form[name='search']");
if (!form) return false;
const set = (name, value) => { if (form[name]) form[name].value = value; };
set("cmQuery", args.keyword);
set("cmQueryEncoding", encodeURIComponent(args.keyword));
set("cmQueryOption", "00");
set("cmPageNo", "1");
set("mode", "");
set("clickcontrol", "disable");
set("htmlvalue", args.keyword);
form.method = "post";
form.target = "_self";
form.action = args.action;
__markPending(window);
setTimeout(() => form.submit(), 0);
return true;
"#;

const PAGE_STATE: &str = r#"
let pending = false;
let ready = true;
for (const win of __frames) {
  let doc;
  try { doc = win.document; } catch (e) { continue; }
  const mark = win.__sminfoPending;
  if (mark === "leaving") {
    pending = true;
  } else if (typeof mark === "number") {
    if (Date.now() - mark < args.grace_ms) pending = true;
    else delete win.__sminfoPending;
  }
  if (doc.readyState !== "complete") ready = false;
}
return { pending, ready };
"#;

/// One frame as reported by [`snapshot_frames`].
#[derive(Debug, Clone, Deserialize)]
pub struct RawFrame {
    pub index: usize,
    pub url: String,
    pub html: Option<String>,
    pub error: Option<String>,
}

/// Match reported by [`locate_visible`]: frame and selector position.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RawLocation {
    pub frame: usize,
    pub position: usize,
}

fn render(body: &str, args: Value) -> String {
    format!("(() => {{\n{PRELUDE}\nconst args = {args};\n{body}\n}})()")
}

/// Pending-navigation and load state across all readable frames.
pub fn page_state() -> String {
    render(
        PAGE_STATE,
        json!({ "grace_ms": NAVIGATION_GRACE.as_millis() as u64 }),
    )
}

pub fn snapshot_frames() -> String {
    render(SNAPSHOT, json!({}))
}

pub fn locate_visible(selectors: &[SelectorSpec]) -> String {
    render(LOCATE, json!({ "selectors": selectors }))
}

pub fn fill(frame: usize, spec: &SelectorSpec, value: &str) -> String {
    render(FILL, json!({ "frame": frame, "spec": spec, "value": value }))
}

pub fn focus(frame: usize, spec: &SelectorSpec) -> String {
    render(FOCUS, json!({ "frame": frame, "spec": spec }))
}

pub fn click(frame: usize, spec: &SelectorSpec) -> String {
    render(CLICK, json!({ "frame": frame, "spec": spec }))
}

pub fn click_link(text: &str, how: LinkMatch) -> String {
    render(CLICK_LINK, json!({ "text": text, "how": how }))
}

pub fn page_script(script: &PageScript) -> String {
    match script {
        PageScript::PostForm { action, fields } => {
            render(POST_FORM, json!({ "action": action, "fields": fields }))
        }
        PageScript::SubmitSearch { action, keyword } => {
            render(SUBMIT_SEARCH, json!({ "action": action, "keyword": keyword }))
        }
    }
}
