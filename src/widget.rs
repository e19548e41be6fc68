use once_cell::sync::Lazy;
use urlencoding::encode;

const STORE_ROOT: &str = "https://hopsport.co/products";
const PARAGRAPH_CLOSE: &str = "</p>";

#[derive(Debug, Clone, Copy)]
pub struct Product {
    pub title: &'static str,
    pub handle: &'static str,
    pub image: &'static str,
}

impl Product {
    pub fn url(&self) -> String {
        format!("{STORE_ROOT}/{}", encode(self.handle))
    }
}

pub const PRODUCTS: [Product; 2] = [
    Product {
        title: "הופספורט - שרוול זרוע ריצה לסמארטפון (מארז 2 יחידות)",
        handle: "הופספורט-שרוול-זרוע-ריצה-לסמארטפון-הדגם-המשופר-מארז-2-יחידות",
        image: "https://cdn.shopify.com/s/files/1/0533/2089/files/placeholder.jpg",
    },
    Product {
        title: "הופספורט - שרוול זרוע ריצה לסמארטפון (מארז 3 יחידות)",
        handle: "הופספורט-שרוול-זרוע-ריצה-לסמארטפון-הדגם-המשופר-מארז-של-3-יחידות",
        image: "https://cdn.shopify.com/s/files/1/0533/2089/files/placeholder.jpg",
    },
];

pub static PRODUCT_WIDGET: Lazy<String> = Lazy::new(|| render_widget(&PRODUCTS));

fn render_card(product: &Product) -> String {
    format!(
        r#"
            <div style="flex: 1; min-width: 200px;">
                <a href="{url}" style="text-decoration: none; color: #333;">
                    <img src="{image}" alt="{title}" style="width: 100%; border-radius: 8px; margin-bottom: 10px;">
                    <div style="font-weight: bold;">{title}</div>
                </a>
            </div>"#,
        url = product.url(),
        image = product.image,
        title = product.title,
    )
}

pub fn render_widget(products: &[Product]) -> String {
    let cards: String = products.iter().map(render_card).collect();
    format!(
        r#"
    <div style="margin: 40px auto; max-width: 600px; padding: 20px; border: 1px solid #eee; border-radius: 10px; text-align: center; background-color: #f9f9f9; direction: rtl;">
        <h3 style="margin-bottom: 20px; color: #333;">המוצרים המומלצים שלנו לריצה 🏃‍♂️</h3>
        <div style="display: flex; justify-content: center; gap: 20px; flex-wrap: wrap;">{cards}
        </div>
    </div>
    "#
    )
}

/// Splices `widget` right after the first `</p>`, or appends it when there is none.
pub fn inject_widget(body: &str, widget: &str) -> String {
    let mut out = String::with_capacity(body.len() + widget.len());
    match body.find(PARAGRAPH_CLOSE) {
        Some(pos) => {
            let split = pos + PARAGRAPH_CLOSE.len();
            out.push_str(&body[..split]);
            out.push_str(widget);
            out.push_str(&body[split..]);
        }
        None => {
            out.push_str(body);
            out.push_str(widget);
        }
    }
    out
}
