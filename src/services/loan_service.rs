use tonic::{Request, Response, Status};

use crate::db::owner_from_request;
use crate::error::AppError;
use crate::ledger::Ledger;
use crate::models::{LineRequest, LoanFilter, LoanReturn, LoanStatus, NewLoan};
use crate::proto::common::Empty;
use crate::proto::loans::loan_service_server::LoanService;
use crate::proto::loans::{
    CreateLoanReq, GetLoanReq, ListLoansReq, ListLoansRes, LoanRes, ReturnLoanReq,
};
use crate::services::convert::{
    date_or_today, evidence_input, loan_to_proto, parse_date, parse_id, parse_optional_date,
};

pub struct LoanServiceImpl {
    ledger: Ledger,
}

impl LoanServiceImpl {
    pub fn new(ledger: Ledger) -> Self {
        Self { ledger }
    }
}

#[tonic::async_trait]
impl LoanService for LoanServiceImpl {
    async fn create_loan(&self, request: Request<CreateLoanReq>) -> Result<Response<LoanRes>, Status> {
        let owner_id = owner_from_request(&request)?;
        let req = request.into_inner();

        if req.due_date.trim().is_empty() {
            return Err(AppError::missing_fields(&["due_date"]).into());
        }
        let lines = req
            .lines
            .iter()
            .map(|l| {
                Ok(LineRequest {
                    item_id: parse_id("lines.item_id", &l.item_id)?,
                    quantity: l.quantity,
                })
            })
            .collect::<Result<Vec<_>, AppError>>()?;

        let draft = NewLoan {
            borrower_name: req.borrower_name,
            borrower_phone: Some(req.borrower_phone),
            loan_date: date_or_today("loan_date", &req.loan_date)?,
            due_date: parse_date("due_date", &req.due_date)?,
            lines,
            evidence: evidence_input(req.photos, req.positional_photos)?,
        };
        let detail = self.ledger.create_loan(owner_id, draft).await?;

        Ok(Response::new(LoanRes {
            loan: Some(loan_to_proto(&detail)),
        }))
    }

    async fn get_loan(&self, request: Request<GetLoanReq>) -> Result<Response<LoanRes>, Status> {
        let owner_id = owner_from_request(&request)?;
        let id = parse_id("id", &request.get_ref().id)?;

        let detail = self.ledger.get_loan(owner_id, id).await?;
        Ok(Response::new(LoanRes {
            loan: Some(loan_to_proto(&detail)),
        }))
    }

    async fn list_loans(&self, request: Request<ListLoansReq>) -> Result<Response<ListLoansRes>, Status> {
        let owner_id = owner_from_request(&request)?;
        let req = request.into_inner();

        let status = match req.status.trim() {
            "" => None,
            s => Some(LoanStatus::parse(s).map_err(|e| AppError::Validation(e.to_string()))?),
        };
        let filter = LoanFilter {
            status,
            due_before: parse_optional_date("due_before", &req.due_before)?,
        };
        let loans = self.ledger.list_loans(owner_id, &filter).await?;

        Ok(Response::new(ListLoansRes {
            loans: loans.iter().map(loan_to_proto).collect(),
        }))
    }

    async fn return_loan(&self, request: Request<ReturnLoanReq>) -> Result<Response<LoanRes>, Status> {
        let owner_id = owner_from_request(&request)?;
        let req = request.into_inner();
        let id = parse_id("id", &req.id)?;

        let ret = LoanReturn {
            returned_on: date_or_today("returned_on", &req.returned_on)?,
            evidence: evidence_input(req.photos, req.positional_photos)?,
        };
        let detail = self.ledger.return_loan(owner_id, id, ret).await?;

        Ok(Response::new(LoanRes {
            loan: Some(loan_to_proto(&detail)),
        }))
    }

    async fn delete_loan(&self, request: Request<GetLoanReq>) -> Result<Response<Empty>, Status> {
        let owner_id = owner_from_request(&request)?;
        let id = parse_id("id", &request.get_ref().id)?;

        self.ledger.delete_loan(owner_id, id).await?;
        Ok(Response::new(Empty {}))
    }
}
