use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use tonic::{Request, Response, Status};

use crate::db::owner_from_request;
use crate::error::AppError;
use crate::ledger::Ledger;
use crate::models::EvidenceSlot;
use crate::proto::common::{self, Empty};
use crate::proto::evidence::evidence_service_server::EvidenceService;
use crate::proto::evidence::{
    AttachItemPhotoReq, AttachLinePhotoReq, DeleteItemPhotoReq, DownloadPhotoReq, DownloadPhotoRes,
    UploadPhotoReq, UploadPhotoRes,
};
use crate::services::convert::{parse_id, photo_to_proto};

pub struct EvidenceServiceImpl {
    ledger: Ledger,
}

impl EvidenceServiceImpl {
    pub fn new(ledger: Ledger) -> Self {
        Self { ledger }
    }

    fn parse_slot(value: &str) -> Result<EvidenceSlot, AppError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "loan" => Ok(EvidenceSlot::Loan),
            "return" => Ok(EvidenceSlot::Return),
            other => Err(AppError::Validation(format!(
                "slot must be 'loan' or 'return', got '{}'",
                other
            ))),
        }
    }
}

#[tonic::async_trait]
impl EvidenceService for EvidenceServiceImpl {
    async fn upload_photo(&self, request: Request<UploadPhotoReq>) -> Result<Response<UploadPhotoRes>, Status> {
        let owner_id = owner_from_request(&request)?;
        let req = request.into_inner();

        // Raw bytes take precedence; base64 is for clients that can only send text.
        let data = match req.blob_base64 {
            Some(encoded) if req.content.is_empty() => BASE64
                .decode(encoded.trim())
                .map_err(|e| AppError::Validation(format!("blob_base64 is not valid base64: {}", e)))?,
            _ => req.content,
        };

        let path = self
            .ledger
            .upload_photo(owner_id, &req.filename, Some(&req.content_type), &data)
            .await?;
        Ok(Response::new(UploadPhotoRes { path }))
    }

    async fn download_photo(
        &self,
        request: Request<DownloadPhotoReq>,
    ) -> Result<Response<DownloadPhotoRes>, Status> {
        let owner_id = owner_from_request(&request)?;
        let (content, content_type) = self
            .ledger
            .download_photo(owner_id, &request.get_ref().path)
            .await?;
        Ok(Response::new(DownloadPhotoRes {
            content,
            content_type: content_type.to_string(),
        }))
    }

    async fn attach_item_photo(
        &self,
        request: Request<AttachItemPhotoReq>,
    ) -> Result<Response<common::EvidencePhoto>, Status> {
        let owner_id = owner_from_request(&request)?;
        let req = request.into_inner();
        let item_id = parse_id("item_id", &req.item_id)?;

        let photo = self.ledger.attach_item_photo(owner_id, item_id, &req.path).await?;
        Ok(Response::new(photo_to_proto(&photo)))
    }

    async fn attach_line_photo(
        &self,
        request: Request<AttachLinePhotoReq>,
    ) -> Result<Response<common::EvidencePhoto>, Status> {
        let owner_id = owner_from_request(&request)?;
        let req = request.into_inner();
        let line_item_id = parse_id("line_item_id", &req.line_item_id)?;
        let slot = Self::parse_slot(&req.slot)?;

        let photo = self
            .ledger
            .attach_line_photo(owner_id, line_item_id, slot, &req.path)
            .await?;
        Ok(Response::new(photo_to_proto(&photo)))
    }

    async fn delete_item_photo(&self, request: Request<DeleteItemPhotoReq>) -> Result<Response<Empty>, Status> {
        let owner_id = owner_from_request(&request)?;
        let id = parse_id("id", &request.get_ref().id)?;

        self.ledger.delete_item_photo(owner_id, id).await?;
        Ok(Response::new(Empty {}))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_slot() {
        assert_eq!(EvidenceServiceImpl::parse_slot("").unwrap(), EvidenceSlot::Loan);
        assert_eq!(EvidenceServiceImpl::parse_slot("Return").unwrap(), EvidenceSlot::Return);
        assert!(EvidenceServiceImpl::parse_slot("later").is_err());
    }
}
