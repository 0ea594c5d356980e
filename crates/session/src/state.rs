use serde::{Deserialize, Serialize};

use teahouse_core::{DeliveryDetails, DeliveryMethod, ImageRef, ProductKey, UnitKind};

/// Product attribute an administrator edits through a one-step flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductField {
    Price,
    PiecePrice,
    BulkStock,
    PieceStock,
    Description,
    Image,
}

/// Checkout progress. Each variant carries everything the earlier steps
/// collected, so a mid-flow state is always internally consistent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckoutFlow {
    City,
    Delivery {
        city: String,
    },
    Name {
        city: String,
        method: DeliveryMethod,
    },
    Phone {
        city: String,
        method: DeliveryMethod,
        recipient: String,
    },
}

/// Per-user dialogue state: a single tagged variant, so two flows can never
/// be active at once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    Idle,
    /// Waiting for a custom quantity for one product.
    AmountEntry { product: ProductKey, unit: UnitKind },
    /// Collecting checkout delivery details, step by step.
    Checkout(CheckoutFlow),
    /// Administrator is editing one product attribute.
    AdminEdit { product: ProductKey, field: ProductField },
    /// Administrator is naming a new category.
    NewCategory,
    /// Administrator is naming a new product in an existing category.
    NewProduct { category: String },
    /// Administrator is composing a broadcast message.
    Broadcast,
}

/// One piece of user input routed into a flow.
#[derive(Debug, Clone, Copy)]
pub enum FlowInput<'a> {
    /// Free-text message.
    Text(&'a str),
    /// A structured selection (inline button payload).
    Selection(&'a str),
    /// A photo upload.
    Photo(&'a ImageRef),
}

/// The next thing to ask the user for after a successful mid-flow step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowPrompt {
    ChooseDelivery,
    EnterName,
    EnterPhone,
}

/// Why a step refused its input. The step pointer does not move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowRejection {
    /// Not a positive whole number.
    InvalidQuantity,
    /// Not a positive whole price.
    InvalidPrice,
    /// Not a whole stock count.
    InvalidCount,
    /// Required free text was empty.
    EmptyText,
    /// Selection did not name a known delivery method.
    UnknownDelivery,
    /// This step needs a photo.
    ExpectedPhoto,
    /// Input kind does not match what the step awaits.
    UnexpectedInput,
}

/// Completed field set of a finished flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowOutcome {
    AddToCart {
        product: ProductKey,
        unit: UnitKind,
        quantity: u32,
    },
    CheckoutDetails(DeliveryDetails),
    SetPrice {
        product: ProductKey,
        price: u64,
    },
    SetPiecePrice {
        product: ProductKey,
        price: u64,
    },
    SetStock {
        product: ProductKey,
        unit: UnitKind,
        quantity: u32,
    },
    SetDescription {
        product: ProductKey,
        description: String,
    },
    SetImage {
        product: ProductKey,
        image: ImageRef,
    },
    CreateCategory {
        name: String,
    },
    CreateProduct {
        category: String,
        name: String,
    },
    Broadcast {
        text: String,
    },
}

/// Result of feeding one input into a flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// Step accepted; here is the follow-up state and the next prompt.
    Continue(SessionState, FlowPrompt),
    /// Final step accepted; the flow is done.
    Complete(FlowOutcome),
    /// Input refused; the state is returned unchanged.
    Reject(SessionState, FlowRejection),
}

fn parse_positive_u32(raw: &str) -> Option<u32> {
    raw.trim().parse::<u32>().ok().filter(|n| *n > 0)
}

fn parse_u32(raw: &str) -> Option<u32> {
    raw.trim().parse::<u32>().ok()
}

fn parse_positive_u64(raw: &str) -> Option<u64> {
    raw.trim().parse::<u64>().ok().filter(|n| *n > 0)
}

fn nonempty(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

impl SessionState {
    pub fn is_idle(&self) -> bool {
        matches!(self, SessionState::Idle)
    }

    /// Feed one input into the active flow.
    ///
    /// Consumes the state and returns either the advanced state, the
    /// completed outcome, or the untouched state plus a rejection.
    pub fn advance(self, input: FlowInput<'_>) -> StepOutcome {
        use StepOutcome::{Complete, Reject};

        match self {
            SessionState::Idle => Reject(SessionState::Idle, FlowRejection::UnexpectedInput),

            SessionState::AmountEntry { product, unit } => match input {
                FlowInput::Text(raw) => match parse_positive_u32(raw) {
                    Some(quantity) => Complete(FlowOutcome::AddToCart {
                        product,
                        unit,
                        quantity,
                    }),
                    None => Reject(
                        SessionState::AmountEntry { product, unit },
                        FlowRejection::InvalidQuantity,
                    ),
                },
                _ => Reject(
                    SessionState::AmountEntry { product, unit },
                    FlowRejection::UnexpectedInput,
                ),
            },

            SessionState::Checkout(flow) => flow.advance(input),

            SessionState::AdminEdit { product, field } => {
                Self::advance_admin_edit(product, field, input)
            }

            SessionState::NewCategory => match input {
                FlowInput::Text(raw) => match nonempty(raw) {
                    Some(name) => Complete(FlowOutcome::CreateCategory { name }),
                    None => Reject(SessionState::NewCategory, FlowRejection::EmptyText),
                },
                _ => Reject(SessionState::NewCategory, FlowRejection::UnexpectedInput),
            },

            SessionState::NewProduct { category } => match input {
                FlowInput::Text(raw) => match nonempty(raw) {
                    Some(name) => Complete(FlowOutcome::CreateProduct { category, name }),
                    None => Reject(
                        SessionState::NewProduct { category },
                        FlowRejection::EmptyText,
                    ),
                },
                _ => Reject(
                    SessionState::NewProduct { category },
                    FlowRejection::UnexpectedInput,
                ),
            },

            SessionState::Broadcast => match input {
                FlowInput::Text(raw) => match nonempty(raw) {
                    Some(text) => Complete(FlowOutcome::Broadcast { text }),
                    None => Reject(SessionState::Broadcast, FlowRejection::EmptyText),
                },
                _ => Reject(SessionState::Broadcast, FlowRejection::UnexpectedInput),
            },
        }
    }

    fn advance_admin_edit(
        product: ProductKey,
        field: ProductField,
        input: FlowInput<'_>,
    ) -> StepOutcome {
        use StepOutcome::{Complete, Reject};

        fn keep(product: ProductKey, field: ProductField, why: FlowRejection) -> StepOutcome {
            Reject(SessionState::AdminEdit { product, field }, why)
        }

        match field {
            ProductField::Price | ProductField::PiecePrice => match input {
                FlowInput::Text(raw) => match parse_positive_u64(raw) {
                    Some(price) => Complete(if field == ProductField::Price {
                        FlowOutcome::SetPrice { product, price }
                    } else {
                        FlowOutcome::SetPiecePrice { product, price }
                    }),
                    None => keep(product, field, FlowRejection::InvalidPrice),
                },
                _ => keep(product, field, FlowRejection::UnexpectedInput),
            },

            ProductField::BulkStock | ProductField::PieceStock => match input {
                // Zero is a valid restock value: it takes a product off sale.
                FlowInput::Text(raw) => match parse_u32(raw) {
                    Some(quantity) => Complete(FlowOutcome::SetStock {
                        product,
                        unit: if field == ProductField::BulkStock {
                            UnitKind::Bulk
                        } else {
                            UnitKind::Piece
                        },
                        quantity,
                    }),
                    None => keep(product, field, FlowRejection::InvalidCount),
                },
                _ => keep(product, field, FlowRejection::UnexpectedInput),
            },

            ProductField::Description => match input {
                FlowInput::Text(raw) => match nonempty(raw) {
                    Some(description) => Complete(FlowOutcome::SetDescription {
                        product,
                        description,
                    }),
                    None => keep(product, field, FlowRejection::EmptyText),
                },
                _ => keep(product, field, FlowRejection::UnexpectedInput),
            },

            ProductField::Image => match input {
                FlowInput::Photo(image) => Complete(FlowOutcome::SetImage {
                    product,
                    image: image.clone(),
                }),
                _ => keep(product, field, FlowRejection::ExpectedPhoto),
            },
        }
    }
}

impl CheckoutFlow {
    fn advance(self, input: FlowInput<'_>) -> StepOutcome {
        use StepOutcome::{Complete, Continue, Reject};

        let checkout = |flow| SessionState::Checkout(flow);

        match self {
            CheckoutFlow::City => match input {
                FlowInput::Text(raw) => match nonempty(raw) {
                    Some(city) => Continue(
                        checkout(CheckoutFlow::Delivery { city }),
                        FlowPrompt::ChooseDelivery,
                    ),
                    None => Reject(checkout(CheckoutFlow::City), FlowRejection::EmptyText),
                },
                _ => Reject(checkout(CheckoutFlow::City), FlowRejection::UnexpectedInput),
            },

            CheckoutFlow::Delivery { city } => match input {
                FlowInput::Selection(tag) => match tag.parse::<DeliveryMethod>() {
                    Ok(method) => Continue(
                        checkout(CheckoutFlow::Name { city, method }),
                        FlowPrompt::EnterName,
                    ),
                    Err(_) => Reject(
                        checkout(CheckoutFlow::Delivery { city }),
                        FlowRejection::UnknownDelivery,
                    ),
                },
                _ => Reject(
                    checkout(CheckoutFlow::Delivery { city }),
                    FlowRejection::UnexpectedInput,
                ),
            },

            CheckoutFlow::Name { city, method } => match input {
                FlowInput::Text(raw) => match nonempty(raw) {
                    Some(recipient) => Continue(
                        checkout(CheckoutFlow::Phone {
                            city,
                            method,
                            recipient,
                        }),
                        FlowPrompt::EnterPhone,
                    ),
                    None => Reject(
                        checkout(CheckoutFlow::Name { city, method }),
                        FlowRejection::EmptyText,
                    ),
                },
                _ => Reject(
                    checkout(CheckoutFlow::Name { city, method }),
                    FlowRejection::UnexpectedInput,
                ),
            },

            CheckoutFlow::Phone {
                city,
                method,
                recipient,
            } => match input {
                FlowInput::Text(raw) => match nonempty(raw) {
                    Some(phone) => Complete(FlowOutcome::CheckoutDetails(DeliveryDetails {
                        city,
                        method,
                        recipient,
                        phone,
                    })),
                    None => Reject(
                        checkout(CheckoutFlow::Phone {
                            city,
                            method,
                            recipient,
                        }),
                        FlowRejection::EmptyText,
                    ),
                },
                _ => Reject(
                    checkout(CheckoutFlow::Phone {
                        city,
                        method,
                        recipient,
                    }),
                    FlowRejection::UnexpectedInput,
                ),
            },
        }
    }
}
