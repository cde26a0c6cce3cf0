// admin_console/src/session.rs

//! A scripted admin session: the clicks a user would make in the form.

use catalog_admin::{FormController, FormDraft, LocalImage, NotificationLevel, Product, ProductFields};

// A 1x1 transparent PNG.
const PIXEL_PNG: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAQAAAC1HAwCAAAAC0lEQVR42mNkYAAAAAYAAjCB0C8AAAAASUVORK5CYII=";

pub fn render(label: &str, products: &[Product]) {
  let mut products = products.to_vec();
  products.sort_by(|a, b| a.fields.name.cmp(&b.fields.name));
  println!("--- catalog ({}, {} products) ---", label, products.len());
  for p in &products {
    let image = if p.image_ref.is_empty() { "-" } else { p.image_ref.as_str() };
    println!(
      "  {:<10} {:>8.2}  {:<8} {}  [{}]",
      p.fields.name, p.fields.price, p.fields.category, image, p.product_id
    );
  }
}

fn report(controller: &FormController) {
  for note in controller.take_notifications() {
    match note.level {
      NotificationLevel::Success => println!("[ok]    {}", note.message),
      NotificationLevel::Error => println!("[error] {}", note.message),
    }
  }
}

fn fields(name: &str, price: f64, category: &str) -> ProductFields {
  ProductFields {
    name: name.to_string(),
    price,
    description: format!("{} for the demo catalog", name),
    category: category.to_string(),
    alt_text: format!("photo of a {}", name.to_lowercase()),
  }
}

/// Snapshot of one product as the list view would hand it to the form.
async fn pick(controller: &FormController, name: &str) -> anyhow::Result<Product> {
  let feed = controller.catalog().observe_all().await?;
  let found = feed.current().into_iter().find(|p| p.fields.name == name);
  feed.cancel();
  found.ok_or_else(|| anyhow::anyhow!("product '{}' is not in the catalog", name))
}

pub async fn run(controller: &FormController) -> anyhow::Result<()> {
  // An incomplete draft never reaches the backend.
  controller.open_create()?;
  controller.edit_draft(|d| d.name = "Widget".to_string())?;
  if let Err(e) = controller.submit().await {
    tracing::warn!(error = %e, "Submit rejected as expected.");
  }
  report(controller);

  controller.edit_draft(|d| *d = FormDraft::from_fields(fields("Widget", 9.99, "tools")))?;
  controller.pick_local_image(LocalImage::data_url("widget.png", PIXEL_PNG))?;
  controller.submit().await?;
  report(controller);

  controller.open_create()?;
  controller.edit_draft(|d| *d = FormDraft::from_fields(fields("Gadget", 25.0, "toys")))?;
  controller.submit().await?;
  report(controller);

  let widget = pick(controller, "Widget").await?;
  controller.open_edit(&widget)?;
  controller.edit_draft(|d| d.price = Some(12.50))?;
  controller.submit().await?;
  report(controller);

  for name in ["Gadget", "Widget"] {
    let product = pick(controller, name).await?;
    controller.request_delete(&product).await?;
    report(controller);
  }

  Ok(())
}
