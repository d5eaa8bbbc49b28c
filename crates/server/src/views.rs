//! HTML pages
//!
//! The chat page is static; the admin dashboard is rendered with
//! minijinja (HTML auto-escaping is on for `.html` templates).

use minijinja::{context, Environment};
use std::collections::BTreeMap;

use realty_agent_agent::SessionState;
use realty_agent_core::Lead;

pub const CHAT_UI_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Property Assistant</title>
<style>
  body { font-family: sans-serif; max-width: 640px; margin: 2rem auto; }
  #log { border: 1px solid #ccc; height: 360px; overflow-y: auto; padding: .5rem; }
  .user { text-align: right; color: #1a4d8f; }
  .bot { color: #333; }
  #lead-form { display: none; margin-top: 1rem; }
  input { margin: .2rem 0; width: 100%; }
</style>
</head>
<body>
<h2>Property Assistant</h2>
<div id="log"></div>
<form id="chat-form">
  <input id="message" autocomplete="off" placeholder="Type a message">
</form>
<form id="lead-form">
  <input name="name" placeholder="Name">
  <input name="phone" placeholder="Phone">
  <input name="email" placeholder="Email">
  <button type="submit">Send my details</button>
</form>
<script>
const sessionId = localStorage.getItem("session_id") || crypto.randomUUID();
localStorage.setItem("session_id", sessionId);
const log = document.getElementById("log");
function say(cls, text) {
  const p = document.createElement("p");
  p.className = cls;
  p.textContent = text;
  log.appendChild(p);
  log.scrollTop = log.scrollHeight;
}
document.getElementById("chat-form").addEventListener("submit", async (e) => {
  e.preventDefault();
  const input = document.getElementById("message");
  const message = input.value.trim();
  if (!message) return;
  input.value = "";
  say("user", message);
  const res = await fetch("/chat", {
    method: "POST",
    headers: { "Content-Type": "application/json" },
    body: JSON.stringify({ message, session_id: sessionId }),
  });
  const data = await res.json();
  say("bot", data.reply || data.error);
  if (data.show_lead_form) document.getElementById("lead-form").style.display = "block";
});
document.getElementById("lead-form").addEventListener("submit", async (e) => {
  e.preventDefault();
  const form = new FormData(e.target);
  const body = {};
  for (const key of ["name", "phone", "email"]) body[key] = form.get(key) || null;
  await fetch("/lead", {
    method: "POST",
    headers: { "Content-Type": "application/json" },
    body: JSON.stringify(body),
  });
  e.target.style.display = "none";
  say("bot", "Thanks! Our team will contact you shortly.");
});
</script>
</body>
</html>
"#;

const ADMIN_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Leads Dashboard</title>
<style>
  body { font-family: sans-serif; margin: 2rem; }
  table { border-collapse: collapse; margin-bottom: 2rem; }
  th, td { border: 1px solid #ccc; padding: .3rem .6rem; text-align: left; }
</style>
</head>
<body>
<h2>Leads ({{ leads|length }})</h2>
<table>
  <tr><th>ID</th><th>Name</th><th>Phone</th><th>Email</th><th>Captured</th></tr>
  {% for lead in leads %}
  <tr>
    <td>{{ lead.id }}</td>
    <td>{{ lead.name or "-" }}</td>
    <td>{{ lead.phone or "-" }}</td>
    <td>{{ lead.email or "-" }}</td>
    <td>{{ lead.created_at or "-" }}</td>
  </tr>
  {% endfor %}
</table>
<h2>Sessions ({{ sessions|length }})</h2>
<table>
  <tr><th>Session</th><th>Intent</th><th>Property</th><th>Budget</th><th>City</th><th>Messages</th><th>Last active</th></tr>
  {% for id, session in sessions|items %}
  <tr>
    <td>{{ id }}</td>
    <td>{{ session.intent or "-" }}</td>
    <td>{{ session.property_type or "-" }}</td>
    <td>{{ session.budget or "-" }}</td>
    <td>{{ session.city or "-" }}</td>
    <td>{{ session.messages|length }}</td>
    <td>{{ session.updated_at }}</td>
  </tr>
  {% endfor %}
</table>
</body>
</html>
"#;

/// Render the admin dashboard
pub fn render_dashboard(
    leads: &[Lead],
    sessions: &BTreeMap<String, SessionState>,
) -> Result<String, minijinja::Error> {
    let mut env = Environment::new();
    env.add_template("admin.html", ADMIN_TEMPLATE)?;
    env.get_template("admin.html")?
        .render(context! { leads => leads, sessions => sessions })
}

#[cfg(test)]
mod tests {
    use super::*;
    use realty_agent_core::{City, Intent, NewLead};

    #[test]
    fn test_dashboard_lists_leads_and_sessions() {
        let leads = vec![Lead::from_new(
            1,
            NewLead::new(Some("Asha"), Some("9876543210"), None::<String>),
            None,
        )];
        let mut state = SessionState::new();
        state.intent = Some(Intent::Buy);
        state.city = Some(City::Pune);
        let sessions = BTreeMap::from([("abc".to_string(), state)]);

        let html = render_dashboard(&leads, &sessions).unwrap();
        assert!(html.contains("Leads (1)"));
        assert!(html.contains("Asha"));
        assert!(html.contains("BUY"));
        assert!(html.contains("Pune"));
        assert!(html.contains("abc"));
    }

    #[test]
    fn test_dashboard_escapes_lead_fields() {
        let leads = vec![Lead::from_new(
            1,
            NewLead::new(Some("<script>x</script>"), None::<String>, None::<String>),
            None,
        )];
        let html = render_dashboard(&leads, &BTreeMap::new()).unwrap();
        assert!(!html.contains("<script>x</script>"));
        assert!(html.contains("&lt;script&gt;"));
    }
}
