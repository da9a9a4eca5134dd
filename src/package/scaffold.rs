//! Vite project scaffolding around the generated components.

use std::fmt::Write;

use serde_json::{Map, Value, json};

use crate::css::CssStrategy;

use super::PackageOptions;

/// `package.json` for the generated project.
pub fn package_json(options: &PackageOptions) -> String {
    let mut dev = Map::new();
    dev.insert("@vitejs/plugin-react".into(), json!("^4.3.1"));
    dev.insert("vite".into(), json!("^5.4.0"));
    if options.typescript {
        dev.insert("typescript".into(), json!("^5.5.4"));
        dev.insert("@types/react".into(), json!("^18.3.3"));
        dev.insert("@types/react-dom".into(), json!("^18.3.0"));
    }
    if options.css_strategy == CssStrategy::Tailwind {
        dev.insert("tailwindcss".into(), json!("^3.4.10"));
        dev.insert("postcss".into(), json!("^8.4.41"));
        dev.insert("autoprefixer".into(), json!("^10.4.20"));
    }
    let build = if options.typescript {
        "tsc && vite build"
    } else {
        "vite build"
    };
    let manifest = json!({
        "name": project_slug(&options.project_name),
        "private": true,
        "version": "0.1.0",
        "type": "module",
        "scripts": {
            "dev": "vite",
            "build": build,
            "preview": "vite preview",
        },
        "dependencies": {
            "react": "^18.3.1",
            "react-dom": "^18.3.1",
        },
        "devDependencies": Value::Object(dev),
    });
    pretty(&manifest)
}

pub fn tsconfig_json() -> String {
    let config = json!({
        "compilerOptions": {
            "target": "ES2020",
            "useDefineForClassFields": true,
            "lib": ["ES2020", "DOM", "DOM.Iterable"],
            "module": "ESNext",
            "skipLibCheck": true,
            "moduleResolution": "bundler",
            "allowImportingTsExtensions": true,
            "resolveJsonModule": true,
            "isolatedModules": true,
            "noEmit": true,
            "jsx": "react-jsx",
            "strict": true,
        },
        "include": ["src"],
    });
    pretty(&config)
}

pub fn vite_config(typescript: bool) -> (String, String) {
    let path = if typescript {
        "vite.config.ts"
    } else {
        "vite.config.js"
    };
    let source = "import { defineConfig } from 'vite';\n\
                  import react from '@vitejs/plugin-react';\n\
                  \n\
                  export default defineConfig({\n  plugins: [react()],\n});\n";
    (path.to_string(), source.to_string())
}

pub fn index_html(title: &str, typescript: bool) -> String {
    let ext = if typescript { "tsx" } else { "jsx" };
    let title = title
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;");
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n  <head>\n    <meta charset=\"UTF-8\" />\n    \
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\" />\n    \
         <title>{title}</title>\n  </head>\n  <body>\n    <div id=\"root\"></div>\n    \
         <script type=\"module\" src=\"/src/main.{ext}\"></script>\n  </body>\n</html>\n"
    )
}

/// `src/main.(j|t)sx` mounting the root component.
pub fn main_entry(root_component: &str, entry_import: Option<&str>, typescript: bool) -> String {
    let mut out = String::new();
    out.push_str("import React from 'react';\n");
    out.push_str("import ReactDOM from 'react-dom/client';\n");
    let _ = writeln!(out, "import {root_component} from './components/{root_component}';");
    if let Some(import) = entry_import {
        let _ = writeln!(out, "import '{import}';");
    }
    let root = if typescript {
        "document.getElementById('root')!"
    } else {
        "document.getElementById('root')"
    };
    let _ = write!(
        out,
        "\nReactDOM.createRoot({root}).render(\n  <React.StrictMode>\n    <{root_component} />\n  </React.StrictMode>,\n);\n"
    );
    out
}

/// README enumerating the generated components.
pub fn readme(options: &PackageOptions, components: &[String], asset_count: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# {}\n", options.project_name);
    out.push_str("Generated by jsxkit from an HTML mockup.\n\n");
    out.push_str("## Components\n\n");
    if components.is_empty() {
        out.push_str("_No components were generated._\n");
    }
    for name in components {
        let _ = writeln!(out, "- `{name}`");
    }
    let _ = writeln!(
        out,
        "\n## Styling\n\nCSS strategy: `{}`.",
        options.css_strategy
    );
    if asset_count > 0 {
        let _ = writeln!(
            out,
            "\n## Assets\n\n{asset_count} asset(s) extracted under `public/assets/`."
        );
    }
    out.push_str("\n## Development\n\n```sh\nnpm install\nnpm run dev\n```\n");
    out
}

pub const GITIGNORE: &str = "node_modules\ndist\n*.local\n";

/// npm-safe package name.
pub fn project_slug(name: &str) -> String {
    let slug = crate::util::slugify(name);
    if slug.is_empty() {
        "jsxkit-app".to_string()
    } else {
        slug
    }
}

fn pretty(value: &Value) -> String {
    let mut text = serde_json::to_string_pretty(value).unwrap_or_default();
    text.push('\n');
    text
}
