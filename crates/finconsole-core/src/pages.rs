use anyhow::{Context, Result};
use finconsole_form::{FieldSpec, HttpMethod, PageSpec, SelectOption};
use std::fs;
use std::path::Path;

/// The debug pages the console can open, in navigation order.
#[derive(Debug, Clone, Default)]
pub struct PageCatalog {
    pages: Vec<PageSpec>,
}

impl PageCatalog {
    /// The stock pages: withdraw, apply, approve, sign, repay, query, auto.
    pub fn builtin() -> Self {
        let query = PageSpec {
            method: HttpMethod::Get,
            ..standard_page("query", "Data Query", "/data/query")
        };

        Self {
            pages: vec![
                apply_page(),
                standard_page("approve", "Process Approval", "/process/approve"),
                standard_page("sign", "Data Signing", "/data/sign"),
                withdraw_page(),
                standard_page("repay", "Data Repayment", "/transaction/repay"),
                query,
                standard_page("auto", "Auto Run Batch", "/batch/execute"),
            ],
        }
    }

    /// The page opened when nothing else is asked for.
    pub fn default_page(&self) -> Option<&PageSpec> {
        self.get("withdraw").or_else(|| self.pages.first())
    }

    pub fn get(&self, key: &str) -> Option<&PageSpec> {
        self.pages.iter().find(|p| p.key == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PageSpec> {
        self.pages.iter()
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Adds a page, replacing any page with the same key in place.
    pub fn insert(&mut self, page: PageSpec) {
        match self.pages.iter_mut().find(|p| p.key == page.key) {
            Some(existing) => *existing = page,
            None => self.pages.push(page),
        }
    }

    /// Loads one page per `*.yaml` / `*.yml` file in `path`.
    ///
    /// A missing directory is only a warning. Returns the number of pages
    /// loaded.
    pub fn load_from_directory(&mut self, path: impl AsRef<Path>) -> Result<usize> {
        let dir_path = path.as_ref();
        if !dir_path.exists() {
            tracing::warn!(path = ?dir_path, "Page directory does not exist");
            return Ok(0);
        }

        let mut entries: Vec<_> = fs::read_dir(dir_path)
            .with_context(|| format!("Failed to read page directory: {:?}", dir_path))?
            .collect::<std::io::Result<_>>()?;
        entries.sort_by_key(|e| e.path());

        let mut count = 0;
        for entry in entries {
            let path = entry.path();
            let ext = path.extension().and_then(|s| s.to_str());
            if ext != Some("yaml") && ext != Some("yml") {
                continue;
            }

            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read page file: {:?}", path))?;
            let page: PageSpec = serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse YAML: {:?}", path))?;

            tracing::info!(page = %page.key, path = ?path, "Loaded page");
            self.insert(page);
            count += 1;
        }
        Ok(count)
    }
}

fn withdraw_page() -> PageSpec {
    PageSpec {
        key: "withdraw".to_string(),
        title: "Data Withdrawal".to_string(),
        description: "Execute fund withdrawal requests for customer accounts. Supports batch processing via JSON.".to_string(),
        endpoint: "/transaction/withdraw".to_string(),
        method: HttpMethod::Post,
        fields: vec![
            FieldSpec::text("customerId", "Customer ID")
                .placeholder("CUST-001")
                .required(),
            FieldSpec::text("accountId", "Account Number")
                .placeholder("ACC-8888-9999")
                .required(),
            FieldSpec::number("amount", "Withdrawal Amount")
                .placeholder("0.00")
                .required(),
            FieldSpec::select(
                "currency",
                "Currency",
                vec![
                    SelectOption::new("USD", "USD"),
                    SelectOption::new("EUR", "EUR"),
                    SelectOption::new("CNY", "CNY"),
                ],
            )
            .default_value("USD")
            .required(),
            FieldSpec::text("reason", "Withdrawal Reason").placeholder("Client Request"),
            FieldSpec::date("executionDate", "Execution Date").required(),
        ],
    }
}

fn apply_page() -> PageSpec {
    PageSpec {
        key: "apply".to_string(),
        title: "Process Application".to_string(),
        description: "Initiate new loan or service applications.".to_string(),
        endpoint: "/process/apply".to_string(),
        method: HttpMethod::Post,
        fields: vec![
            FieldSpec::text("applicantName", "Applicant Name").required(),
            FieldSpec::select(
                "productType",
                "Product Type",
                vec![
                    SelectOption::new("Personal Loan", "PL"),
                    SelectOption::new("Mortgage", "MORT"),
                ],
            )
            .required(),
            FieldSpec::number("requestedAmount", "Requested Amount").required(),
        ],
    }
}

fn standard_page(key: &str, title: &str, endpoint: &str) -> PageSpec {
    PageSpec {
        key: key.to_string(),
        title: title.to_string(),
        description: format!("Debug interface for {} operations.", title),
        endpoint: endpoint.to_string(),
        method: HttpMethod::Post,
        fields: vec![
            FieldSpec::text("referenceId", "Reference ID").required(),
            FieldSpec::text("actionCode", "Action Code"),
        ],
    }
}
