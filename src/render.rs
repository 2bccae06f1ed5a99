//! Embeddable markup for the launcher button and popup form, themed from the
//! resolved configuration. Styling here is intentionally minimal; real visual
//! polish belongs to the embedding site's stylesheet.

use crate::config::{Position, WidgetConfig};

/// Render the full embed snippet: a scoped stylesheet followed by the widget
/// container markup.
pub fn render_embed(config: &WidgetConfig) -> String {
    format!("<style>\n{}</style>\n{}", stylesheet(config), markup(config))
}

fn anchor_css(position: Position) -> &'static str {
    match position {
        Position::BottomRight => "bottom: 24px; right: 24px;",
        Position::BottomLeft => "bottom: 24px; left: 24px;",
    }
}

fn stylesheet(config: &WidgetConfig) -> String {
    let gradient = config.gradient();
    let anchor = anchor_css(config.position);
    let panel_side = match config.position {
        Position::BottomRight => "right: 0;",
        Position::BottomLeft => "left: 0;",
    };
    format!(
        r#".cw-root {{ position: fixed; {anchor} z-index: 999999; font-family: system-ui, sans-serif; }}
.cw-root * {{ box-sizing: border-box; }}
.cw-launcher {{ width: 60px; height: 60px; border-radius: 50%; border: none; cursor: pointer; background: {gradient}; }}
.cw-popup {{ position: absolute; bottom: 80px; {panel_side} width: 380px; max-width: calc(100vw - 48px); background: #fff; border-radius: 16px; box-shadow: 0 10px 50px rgba(0,0,0,0.15); display: none; }}
.cw-popup.cw-open {{ display: block; }}
.cw-header {{ background: {gradient}; color: #fff; padding: 24px; border-radius: 16px 16px 0 0; }}
.cw-body {{ padding: 24px; }}
.cw-field {{ margin-bottom: 20px; }}
.cw-field input, .cw-field textarea {{ width: 100%; padding: 12px 16px; border: 2px solid #e0e0e0; border-radius: 8px; }}
.cw-field.cw-error input, .cw-field.cw-error textarea {{ border-color: #ef4444; }}
.cw-field .cw-field-error {{ display: none; color: #ef4444; font-size: 13px; margin-top: 6px; }}
.cw-field.cw-error .cw-field-error {{ display: block; }}
.cw-submit {{ width: 100%; padding: 14px; border: none; border-radius: 8px; color: #fff; cursor: pointer; background: {gradient}; }}
.cw-submit:disabled {{ opacity: 0.7; cursor: not-allowed; }}
.cw-panel {{ display: none; padding: 16px; border-radius: 8px; color: #fff; text-align: center; }}
.cw-panel.cw-show {{ display: block; }}
.cw-panel-success {{ background: #10b981; }}
.cw-panel-failure {{ background: #ef4444; }}
"#
    )
}

fn markup(config: &WidgetConfig) -> String {
    let title = escape_html(&config.title);
    let subtitle = escape_html(&config.subtitle);
    format!(
        r#"<div class="cw-root">
  <button class="cw-launcher" type="button" aria-label="Toggle chat" aria-haspopup="dialog"></button>
  <div class="cw-popup" role="dialog" aria-hidden="true">
    <div class="cw-header">
      <h3>{title}</h3>
      <p>{subtitle}</p>
    </div>
    <div class="cw-body">
      <div class="cw-panel cw-panel-success" role="status"></div>
      <div class="cw-panel cw-panel-failure" role="alert"></div>
      <form class="cw-form">
        <div class="cw-field" data-field="name">
          <label>Name</label>
          <input type="text" name="name" placeholder="Enter your name" autocomplete="name">
          <div class="cw-field-error">Please enter your name</div>
        </div>
        <div class="cw-field" data-field="phone">
          <label>Phone</label>
          <input type="tel" name="phone" placeholder="(555) 123-4567" autocomplete="tel">
          <div class="cw-field-error">Please enter a valid phone number</div>
        </div>
        <div class="cw-field" data-field="message">
          <label>Message</label>
          <textarea name="message" rows="4" placeholder="How can we help you?"></textarea>
          <div class="cw-field-error">Please enter your message</div>
        </div>
        <button class="cw-submit" type="submit">Send Message</button>
      </form>
    </div>
  </div>
</div>
"#
    )
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
