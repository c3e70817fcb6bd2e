//! R source templates for the external procedures
//!
//! Column names, the control label, and numeric parameters are passed as
//! positional command-line arguments rather than spliced into the R
//! source, so group names containing quotes or R syntax cannot break the
//! script. Each script reads the input exchange CSV, runs its procedure,
//! and writes one result CSV with a `comparison` column plus at least
//! one p-value-bearing column.

use std::path::Path;

use crate::stats::runner::{Procedure, TestRequest};

/// Tukey HSD over all group pairs (aov + TukeyHSD).
/// Args: in_csv group_col value_col out_csv alpha
const ALL_PAIRS: &str = r#"
args <- commandArgs(trailingOnly = TRUE)
in_csv <- args[1]
group_col <- args[2]
value_col <- args[3]
out_csv <- args[4]
alpha <- as.numeric(args[5])

d <- read.csv(in_csv, stringsAsFactors = FALSE)
d[[group_col]] <- as.factor(d[[group_col]])
d[[value_col]] <- as.numeric(d[[value_col]])

fit <- aov(as.formula(paste(value_col, "~", group_col)), data = d)
tuk <- TukeyHSD(fit, conf.level = 1 - alpha)
dfres <- as.data.frame(tuk[[names(tuk)[1]]])
dfres$comparison <- rownames(dfres)
names(dfres) <- make.names(names(dfres))
write.csv(dfres, out_csv, row.names = FALSE)
"#;

/// Welch t-test of each non-control group against the control, with
/// p.adjust for multiplicity.
/// Args: in_csv group_col value_col control out_csv padj_method alpha
const VS_CONTROL: &str = r#"
args <- commandArgs(trailingOnly = TRUE)
in_csv <- args[1]
group_col <- args[2]
value_col <- args[3]
control <- args[4]
out_csv <- args[5]
padj_method <- args[6]
alpha <- as.numeric(args[7])

d <- read.csv(in_csv, stringsAsFactors = FALSE)
d[[group_col]] <- as.character(d[[group_col]])
others <- setdiff(unique(d[[group_col]]), control)
pvals <- c(); stats <- c(); names <- c()
for (g in others) {
  a <- d[d[[group_col]] == control, value_col]
  b <- d[d[[group_col]] == g, value_col]
  res <- try(t.test(as.numeric(a), as.numeric(b), var.equal = FALSE), silent = TRUE)
  if (inherits(res, "try-error")) {
    pvals <- c(pvals, NA); stats <- c(stats, NA)
  } else {
    pvals <- c(pvals, res$p.value); stats <- c(stats, as.numeric(res$statistic))
  }
  names <- c(names, paste(control, "vs", g))
}
p_adj <- p.adjust(pvals, method = padj_method)
reject <- ifelse(!is.na(p_adj) & p_adj < alpha, TRUE, FALSE)
out_df <- data.frame(comparison = names, statistic = stats, p_raw = pvals,
                     p_adj = p_adj, reject = reject, stringsAsFactors = FALSE)
write.csv(out_df, out_csv, row.names = FALSE)
"#;

/// Repeated-measures variant: within each level of the grouping column,
/// a Welch t-test between the two levels of the secondary factor.
/// Args: in_csv group_col factor_col value_col padj_method out_csv alpha
const VS_CONTROL_FACTOR: &str = r#"
args <- commandArgs(trailingOnly = TRUE)
in_csv <- args[1]
group_col <- args[2]
factor_col <- args[3]
value_col <- args[4]
padj_method <- args[5]
out_csv <- args[6]
alpha <- as.numeric(args[7])

d <- read.csv(in_csv, stringsAsFactors = FALSE)
d[[group_col]] <- as.character(d[[group_col]])
pvals <- c(); stats <- c(); names <- c()
for (g in unique(d[[group_col]])) {
  sub <- d[d[[group_col]] == g, ]
  lv <- unique(sub[[factor_col]])
  if (length(lv) == 2) {
    a <- sub[[value_col]][sub[[factor_col]] == lv[1]]
    b <- sub[[value_col]][sub[[factor_col]] == lv[2]]
    res <- try(t.test(as.numeric(a), as.numeric(b), var.equal = FALSE), silent = TRUE)
    if (inherits(res, "try-error")) {
      pvals <- c(pvals, NA); stats <- c(stats, NA)
    } else {
      pvals <- c(pvals, res$p.value); stats <- c(stats, as.numeric(res$statistic))
    }
    names <- c(names, paste0(g, " : ", lv[1], " vs ", lv[2]))
  } else {
    pvals <- c(pvals, NA); stats <- c(stats, NA)
    names <- c(names, NA)
  }
}
p_adj <- p.adjust(pvals, method = padj_method)
reject <- ifelse(!is.na(p_adj) & p_adj < alpha, TRUE, FALSE)
out_df <- data.frame(comparison = names, statistic = stats, p_raw = pvals,
                     p_adj = p_adj, reject = reject, stringsAsFactors = FALSE)
write.csv(out_df, out_csv, row.names = FALSE)
"#;

/// Classic two-group Welch t-test; fails loudly unless exactly two
/// groups are present.
/// Args: in_csv group_col value_col out_csv
const SINGLE_PAIR: &str = r#"
args <- commandArgs(trailingOnly = TRUE)
in_csv <- args[1]
group_col <- args[2]
value_col <- args[3]
out_csv <- args[4]

d <- read.csv(in_csv, stringsAsFactors = FALSE)
d[[group_col]] <- as.character(d[[group_col]])
groups <- unique(d[[group_col]])
if (length(groups) != 2) {
  stop(sprintf("single-pair test requires exactly 2 groups, found %d", length(groups)))
}
a <- d[d[[group_col]] == groups[1], value_col]
b <- d[d[[group_col]] == groups[2], value_col]
res <- t.test(as.numeric(a), as.numeric(b), var.equal = FALSE)
out_df <- data.frame(comparison = paste(groups[1], "vs", groups[2]),
                     statistic = as.numeric(res$statistic),
                     p_value = res$p.value, stringsAsFactors = FALSE)
write.csv(out_df, out_csv, row.names = FALSE)
"#;

/// R source for a request
pub fn source_for(request: &TestRequest) -> &'static str {
    match request.procedure {
        Procedure::AllPairs => ALL_PAIRS,
        Procedure::EachVsControl if request.factor_col.is_some() => VS_CONTROL_FACTOR,
        Procedure::EachVsControl => VS_CONTROL,
        Procedure::SinglePair => SINGLE_PAIR,
    }
}

/// Dataset columns the procedure consumes, in exchange-file order
pub fn exchange_columns(request: &TestRequest) -> Vec<&str> {
    match (&request.procedure, &request.factor_col) {
        (Procedure::EachVsControl, Some(factor)) => {
            vec![factor.as_str(), request.group_col.as_str(), request.value_col.as_str()]
        }
        _ => vec![request.group_col.as_str(), request.value_col.as_str()],
    }
}

/// Positional arguments after the script path, matching the template's
/// `commandArgs` order. The caller has already validated that a control
/// is present where one is required.
pub fn args_for(request: &TestRequest, in_csv: &Path, out_csv: &Path) -> Vec<String> {
    let in_csv = in_csv.display().to_string();
    let out_csv = out_csv.display().to_string();
    match request.procedure {
        Procedure::AllPairs => vec![
            in_csv,
            request.group_col.clone(),
            request.value_col.clone(),
            out_csv,
            request.alpha.to_string(),
        ],
        Procedure::EachVsControl => match &request.factor_col {
            Some(factor) => vec![
                in_csv,
                request.group_col.clone(),
                factor.clone(),
                request.value_col.clone(),
                request.adjust.clone(),
                out_csv,
                request.alpha.to_string(),
            ],
            None => vec![
                in_csv,
                request.group_col.clone(),
                request.value_col.clone(),
                request.control.clone().unwrap_or_default(),
                out_csv,
                request.adjust.clone(),
                request.alpha.to_string(),
            ],
        },
        Procedure::SinglePair => vec![
            in_csv,
            request.group_col.clone(),
            request.value_col.clone(),
            out_csv,
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn request(procedure: Procedure) -> TestRequest {
        TestRequest {
            procedure,
            group_col: "genotype".to_string(),
            value_col: "weight".to_string(),
            factor_col: None,
            control: Some("WT".to_string()),
            alpha: 0.05,
            adjust: "holm".to_string(),
            timeout: Duration::from_secs(60),
        }
    }

    #[test]
    fn test_all_pairs_arg_order() {
        let req = request(Procedure::AllPairs);
        let args = args_for(&req, Path::new("/tmp/in.csv"), Path::new("/tmp/out.csv"));
        assert_eq!(args, vec!["/tmp/in.csv", "genotype", "weight", "/tmp/out.csv", "0.05"]);
    }

    #[test]
    fn test_vs_control_arg_order() {
        let req = request(Procedure::EachVsControl);
        let args = args_for(&req, Path::new("in.csv"), Path::new("out.csv"));
        assert_eq!(
            args,
            vec!["in.csv", "genotype", "weight", "WT", "out.csv", "holm", "0.05"]
        );
    }

    #[test]
    fn test_factor_mode_switches_template_and_columns() {
        let mut req = request(Procedure::EachVsControl);
        assert_eq!(source_for(&req), VS_CONTROL);
        assert_eq!(exchange_columns(&req), vec!["genotype", "weight"]);

        req.factor_col = Some("time".to_string());
        assert_eq!(source_for(&req), VS_CONTROL_FACTOR);
        assert_eq!(exchange_columns(&req), vec!["time", "genotype", "weight"]);
    }

    #[test]
    fn test_single_pair_takes_no_numeric_params() {
        let req = request(Procedure::SinglePair);
        let args = args_for(&req, Path::new("in.csv"), Path::new("out.csv"));
        assert_eq!(args, vec!["in.csv", "genotype", "weight", "out.csv"]);
    }
}
