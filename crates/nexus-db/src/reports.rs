//! The three canned reports.

use chrono::NaiveDate;
use nexus_core::{CellValue, QueryResult};
use serde::Serialize;

use crate::NexusDb;
use crate::error::DatabaseError;

const ACTIVE_STAFF_PER_PROJECT: &str = "SELECT p.ID_Proj, p.Nome, COUNT(*) AS Quantidade
FROM Projeto AS p, Proj_Func AS pf, Funcionario AS f, Contrato AS c
WHERE p.ID_Proj = pf.ID_Proj AND pf.ID_Func = f.ID_Func AND f.ID_Func = c.ID_Func
  AND c.Status = 'Ativo'
GROUP BY 1, 2 ORDER BY 1";

const EQUIPMENT_USE_PER_LAB: &str = "SELECT l.ID_Lab, l.Nome, COUNT(*) AS Quantidade
FROM Laboratorio AS l, Equipamento AS e, Registro_de_Uso AS r
WHERE l.ID_Lab = e.ID_Lab AND e.ID_Equip = r.ID_Equip
  AND r.Dt_Reg BETWEEN ? AND ?
GROUP BY 1, 2 ORDER BY 1";

const FUNDING_PER_PROJECT: &str = "SELECT p.ID_Proj, p.Nome, ROUND(AVG(f.Valor), 2) AS Media
FROM Financiamento AS f, Projeto AS p, Artigo AS a
WHERE f.ID_Proj = p.ID_Proj AND p.ID_Proj = a.ID_Proj
  AND a.Dt_Pub BETWEEN ? AND ?
GROUP BY 1, 2 ORDER BY 1";

/// A canned report and its parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "report", rename_all = "snake_case")]
pub enum Report {
    /// Employees with an active contract, per project.
    ActiveStaffPerProject,
    /// Equipment uses registered per lab within a date range (inclusive).
    EquipmentUsePerLab { from: NaiveDate, to: NaiveDate },
    /// Average funding per project with articles published in a date range.
    FundingPerProject { from: NaiveDate, to: NaiveDate },
}

impl Report {
    #[must_use]
    pub const fn title(&self) -> &'static str {
        match self {
            Self::ActiveStaffPerProject => "Active-contract employees per project",
            Self::EquipmentUsePerLab { .. } => "Equipment uses per lab",
            Self::FundingPerProject { .. } => "Average funding per project",
        }
    }

    #[must_use]
    pub const fn sql(&self) -> &'static str {
        match self {
            Self::ActiveStaffPerProject => ACTIVE_STAFF_PER_PROJECT,
            Self::EquipmentUsePerLab { .. } => EQUIPMENT_USE_PER_LAB,
            Self::FundingPerProject { .. } => FUNDING_PER_PROJECT,
        }
    }

    /// Column holding the chart value.
    #[must_use]
    pub const fn value_column(&self) -> &'static str {
        match self {
            Self::ActiveStaffPerProject | Self::EquipmentUsePerLab { .. } => "Quantidade",
            Self::FundingPerProject { .. } => "Media",
        }
    }

    /// Column holding the chart label.
    #[must_use]
    pub const fn label_column(&self) -> &'static str {
        "Nome"
    }

    /// Bound parameters. `Dt_Reg` is a timestamp, so its range covers the
    /// whole last day.
    #[must_use]
    pub fn params(&self) -> Vec<CellValue> {
        match self {
            Self::ActiveStaffPerProject => Vec::new(),
            Self::EquipmentUsePerLab { from, to } => {
                let start = from.and_hms_opt(0, 0, 0);
                let end = to.and_hms_opt(23, 59, 59);
                match (start, end) {
                    (Some(start), Some(end)) => {
                        vec![CellValue::DateTime(start), CellValue::DateTime(end)]
                    }
                    _ => vec![CellValue::Date(*from), CellValue::Date(*to)],
                }
            }
            Self::FundingPerProject { from, to } => {
                vec![CellValue::Date(*from), CellValue::Date(*to)]
            }
        }
    }
}

impl NexusDb {
    /// Run a canned report.
    pub async fn run_report(&self, report: &Report) -> Result<QueryResult, DatabaseError> {
        let result = self.fetch(report.sql(), &report.params()).await?;
        tracing::debug!(report = report.title(), rows = result.len(), "report finished");
        Ok(result)
    }
}
