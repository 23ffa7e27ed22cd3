use crate::args::ReportArgs;
use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::repo::ExpenseRepository;
use crate::{report, utils, Config, Result};
use anyhow::Context;
use chrono::NaiveDate;

/// Renders a report of the expenses in `args.range()` as of `today`. The report is returned as
/// the structure, to be printed with `Out::print_document`, unless `args.output()` is given, in
/// which case it is written to that file instead.
pub async fn report(
    config: Config,
    repo: &dyn ExpenseRepository,
    args: ReportArgs,
    today: NaiveDate,
) -> Result<Out<String>> {
    let expenses = repo
        .list_all()
        .await
        .context("Unable to fetch expenses for the report")
        .pub_result(ErrorType::Repository)?;
    let text = report::render(
        args.format(),
        args.range(),
        &expenses,
        today,
        config.currency_symbol(),
    )
    .pub_result(ErrorType::Report)?;

    match args.output() {
        None => Ok(Out::new(
            format!(
                "Rendered the {} report for {}",
                args.format(),
                args.range().label()
            ),
            text,
        )),
        Some(path) => {
            utils::write(path, &text)
                .await
                .pub_result(ErrorType::Report)?;
            Ok(Out::new_message(format!(
                "Wrote the {} report to {}",
                args.format(),
                path.display()
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{ReportFormat, ReportRange, CSV_HEADER};
    use crate::test::{date, expense, repo_with, TestEnv};

    #[tokio::test]
    async fn test_report_printed() {
        let env = TestEnv::new().await;
        let repo = repo_with(vec![
            expense("Lunch", "300", "Food", "2025-03-10"),
            expense("Rent", "1000", "Bills", "2025-01-01"),
        ]);
        let args = ReportArgs::new(ReportFormat::Summary, ReportRange::Week, None);
        let out = report(env.config(), &repo, args, date("2025-03-10"))
            .await
            .unwrap();
        assert_eq!(out.message(), "Rendered the summary report for Last 7 Days");
        let text = out.structure().unwrap();
        assert!(text.starts_with("💰 Expense Report (Last 7 Days)"));
        assert!(text.contains("• Food: ₹300.00 (100.0%)"));
        assert!(!text.contains("Bills"));
    }

    #[tokio::test]
    async fn test_report_written_to_file() {
        let env = TestEnv::new().await;
        let repo = repo_with(vec![expense("Lunch", "300", "Food", "2025-03-10")]);
        let path = env.config().root().join(ReportFormat::Csv.default_file_name());
        let args = ReportArgs::new(ReportFormat::Csv, ReportRange::All, Some(path.clone()));
        let out = report(env.config(), &repo, args, date("2025-03-10"))
            .await
            .unwrap();
        assert!(out.message().starts_with("Wrote the csv report"));

        let written = utils::read(&path).await.unwrap();
        assert!(written.starts_with(CSV_HEADER));
        assert!(out.structure().is_none());
    }
}
