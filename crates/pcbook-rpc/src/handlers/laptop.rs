// crates/pcbook-rpc/src/handlers/laptop.rs
//
// LaptopService: create, search, upload image, rate.
//
// The streaming handlers run their protocol loop in a spawned task that
// feeds a bounded channel backing the response stream. Each loop is written
// against a generic `Stream` of inbound messages so it can be driven by a
// `tonic::Streaming` in production and by an in-memory stream in tests.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::{Stream, StreamExt};
use tonic::{Request, Response, Status, Streaming};
use tracing::{debug, info};
use uuid::Uuid;

use pcbook_core::context::CallContext;
use pcbook_core::error::CatalogError;
use pcbook_core::filter::Filter;
use pcbook_core::laptop::Laptop;
use pcbook_core::traits::{check_image_type, ImageStore, LaptopSink, LaptopStore, RatingStore};

use super::{call_context, context_status, log_status, CancelOnClose, STREAM_BUFFER};
use crate::proto::upload_image_request::Data;
use crate::proto::{
    CreateLaptopRequest, CreateLaptopResponse, ImageInfo, LaptopService, RateLaptopRequest,
    RateLaptopResponse, SearchLaptopRequest, SearchLaptopResponse, UploadImageRequest,
    UploadImageResponse,
};

/// Maximum accepted image size: 1 MiB.
pub const MAX_IMAGE_SIZE: usize = 1 << 20;

type SearchSender = mpsc::Sender<Result<SearchLaptopResponse, Status>>;
type RateSender = mpsc::Sender<Result<RateLaptopResponse, Status>>;

/// Serves the LaptopService over injected stores.
#[derive(Clone)]
pub struct LaptopServer {
    laptops: Arc<dyn LaptopStore>,
    images: Arc<dyn ImageStore>,
    ratings: Arc<dyn RatingStore>,
}

impl std::fmt::Debug for LaptopServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LaptopServer").finish()
    }
}

impl LaptopServer {
    pub fn new(
        laptops: Arc<dyn LaptopStore>,
        images: Arc<dyn ImageStore>,
        ratings: Arc<dyn RatingStore>,
    ) -> Self {
        Self {
            laptops,
            images,
            ratings,
        }
    }

    /// Store a new laptop and return its id. An empty id is replaced by a
    /// fresh UUID; any other id must already be a valid UUID.
    pub async fn create(&self, ctx: &CallContext, laptop: Option<Laptop>) -> Result<String, Status> {
        let mut laptop =
            laptop.ok_or_else(|| Status::invalid_argument("laptop is missing from the request"))?;
        info!("receive a create-laptop request with id: {}", laptop.id);

        if laptop.id.is_empty() {
            laptop.id = Uuid::new_v4().to_string();
        } else if let Err(e) = Uuid::parse_str(&laptop.id) {
            return Err(Status::invalid_argument(format!(
                "laptop ID is not a valid UUID: {}",
                e
            )));
        }

        ctx.check().map_err(context_status)?;

        match self.laptops.save(&laptop).await {
            Ok(id) => {
                info!("saved laptop with id: {}", id);
                Ok(id)
            }
            Err(CatalogError::AlreadyExists(msg)) => Err(Status::already_exists(format!(
                "cannot save laptop to the store: {}",
                msg
            ))),
            Err(CatalogError::Context(e)) => Err(context_status(e)),
            Err(e) => Err(Status::internal(format!(
                "cannot save laptop to the store: {}",
                e
            ))),
        }
    }

    /// Send every laptop matching `filter` down `tx`, one response each.
    pub async fn search(
        &self,
        ctx: &CallContext,
        filter: &Filter,
        tx: &SearchSender,
    ) -> Result<(), Status> {
        info!("receive a search-laptop request with filter: {:?}", filter);

        let mut sink = ResponseSink { tx: tx.clone() };
        match self.laptops.search(ctx, filter, &mut sink).await {
            Ok(()) => Ok(()),
            Err(CatalogError::Context(e)) => Err(context_status(e)),
            Err(e) => Err(Status::internal(format!("unexpected error: {}", e))),
        }
    }

    /// Receive an image upload: one info message, then chunks until the
    /// client closes its side of the stream.
    pub async fn receive_image<S>(
        &self,
        ctx: &CallContext,
        mut stream: S,
    ) -> Result<UploadImageResponse, Status>
    where
        S: Stream<Item = Result<UploadImageRequest, Status>> + Unpin + Send,
    {
        let info = match stream.next().await {
            None => return Err(Status::unknown("cannot receive image info: stream is empty")),
            Some(Err(status)) => {
                return Err(Status::unknown(format!(
                    "cannot receive image info: {}",
                    status.message()
                )))
            }
            Some(Ok(UploadImageRequest {
                data: Some(Data::Info(info)),
            })) => info,
            Some(Ok(_)) => {
                return Err(Status::invalid_argument(
                    "first upload message must carry image info",
                ))
            }
        };
        let ImageInfo {
            laptop_id,
            image_type,
        } = info;
        check_image_type(&image_type).map_err(|e| Status::invalid_argument(e.to_string()))?;
        info!(
            "receive an upload-image request for laptop {} with image type {}",
            laptop_id, image_type
        );

        match self.laptops.find(&laptop_id).await {
            Ok(Some(_)) => {}
            Ok(None) => {
                return Err(Status::invalid_argument(format!(
                    "laptop id {} doesn't exist",
                    laptop_id
                )))
            }
            Err(e) => return Err(Status::internal(format!("cannot find laptop: {}", e))),
        }

        let mut image = Vec::new();
        loop {
            ctx.check().map_err(context_status)?;

            let chunk = match stream.next().await {
                None => {
                    debug!("no more data");
                    break;
                }
                Some(Err(status)) => {
                    return Err(Status::unknown(format!(
                        "cannot receive chunk data: {}",
                        status.message()
                    )))
                }
                Some(Ok(UploadImageRequest {
                    data: Some(Data::ChunkData(chunk)),
                })) => chunk,
                Some(Ok(_)) => {
                    return Err(Status::invalid_argument(
                        "expected chunk data, image info was already received",
                    ))
                }
            };

            debug!("received a chunk with size: {}", chunk.len());
            image.extend_from_slice(&chunk);
            if image.len() > MAX_IMAGE_SIZE {
                return Err(Status::invalid_argument(format!(
                    "image is too large: {} > {}",
                    image.len(),
                    MAX_IMAGE_SIZE
                )));
            }
        }

        let size = image.len();
        let id = self
            .images
            .save(&laptop_id, &image_type, image)
            .await
            .map_err(|e| Status::internal(format!("cannot save image to the store: {}", e)))?;

        info!("saved image with id: {}, size: {}", id, size);
        Ok(UploadImageResponse {
            id,
            size: size as u32,
        })
    }

    /// Rate laptops until the client closes its side of the stream, sending
    /// the updated aggregate after every score.
    pub async fn rate<S>(&self, ctx: &CallContext, mut inbound: S, tx: &RateSender) -> Result<(), Status>
    where
        S: Stream<Item = Result<RateLaptopRequest, Status>> + Unpin + Send,
    {
        loop {
            ctx.check().map_err(context_status)?;

            let request = match inbound.next().await {
                None => {
                    debug!("no more data");
                    return Ok(());
                }
                Some(Err(status)) => {
                    return Err(Status::unknown(format!(
                        "cannot receive stream request: {}",
                        status.message()
                    )))
                }
                Some(Ok(request)) => request,
            };

            let RateLaptopRequest { laptop_id, score } = request;
            debug!("received a rate-laptop request: id = {}, score = {:.2}", laptop_id, score);

            match self.laptops.find(&laptop_id).await {
                Ok(Some(_)) => {}
                Ok(None) => {
                    return Err(Status::not_found(format!(
                        "laptop id {} is not found",
                        laptop_id
                    )))
                }
                Err(e) => return Err(Status::internal(format!("cannot find laptop: {}", e))),
            }

            let rating = self
                .ratings
                .add(&laptop_id, score)
                .await
                .map_err(|e| Status::internal(format!("cannot add rating to the store: {}", e)))?;

            let response = RateLaptopResponse {
                laptop_id,
                rated_count: rating.count,
                average_score: rating.average(),
            };
            if tx.send(Ok(response)).await.is_err() {
                return Err(Status::unknown("cannot send stream response"));
            }
        }
    }
}

/// Forwards search matches into the response channel.
struct ResponseSink {
    tx: SearchSender,
}

#[async_trait]
impl LaptopSink for ResponseSink {
    async fn found(&mut self, laptop: Laptop) -> Result<(), CatalogError> {
        let id = laptop.id.clone();
        self.tx
            .send(Ok(SearchLaptopResponse {
                laptop: Some(laptop),
            }))
            .await
            .map_err(|_| CatalogError::Transport("cannot send stream response".to_string()))?;
        debug!("sent laptop with id: {}", id);
        Ok(())
    }
}

#[tonic::async_trait]
impl LaptopService for LaptopServer {
    type SearchLaptopStream = ReceiverStream<Result<SearchLaptopResponse, Status>>;
    type RateLaptopStream = ReceiverStream<Result<RateLaptopResponse, Status>>;

    async fn create_laptop(
        &self,
        request: Request<CreateLaptopRequest>,
    ) -> Result<Response<CreateLaptopResponse>, Status> {
        let ctx = call_context(&request);
        let id = self
            .create(&ctx, request.into_inner().laptop)
            .await
            .map_err(log_status)?;
        Ok(Response::new(CreateLaptopResponse { id }))
    }

    async fn search_laptop(
        &self,
        request: Request<SearchLaptopRequest>,
    ) -> Result<Response<Self::SearchLaptopStream>, Status> {
        let ctx = call_context(&request);
        let filter = request.into_inner().filter.unwrap_or_default();
        let (tx, rx) = mpsc::channel(STREAM_BUFFER);

        let server = self.clone();
        tokio::spawn(async move {
            let watcher = CancelOnClose::watch(&tx, &ctx);
            let result = server.search(&ctx, &filter, &tx).await;
            drop(watcher);
            if let Err(status) = result {
                let _ = tx.send(Err(log_status(status))).await;
            }
        });

        Ok(Response::new(ReceiverStream::new(rx)))
    }

    async fn upload_image(
        &self,
        request: Request<Streaming<UploadImageRequest>>,
    ) -> Result<Response<UploadImageResponse>, Status> {
        let ctx = call_context(&request);
        let response = self
            .receive_image(&ctx, request.into_inner())
            .await
            .map_err(log_status)?;
        Ok(Response::new(response))
    }

    async fn rate_laptop(
        &self,
        request: Request<Streaming<RateLaptopRequest>>,
    ) -> Result<Response<Self::RateLaptopStream>, Status> {
        let ctx = call_context(&request);
        let inbound = request.into_inner();
        let (tx, rx) = mpsc::channel(STREAM_BUFFER);

        let server = self.clone();
        tokio::spawn(async move {
            let watcher = CancelOnClose::watch(&tx, &ctx);
            let result = server.rate(&ctx, inbound, &tx).await;
            drop(watcher);
            if let Err(status) = result {
                let _ = tx.send(Err(log_status(status))).await;
            }
        });

        Ok(Response::new(ReceiverStream::new(rx)))
    }
}
