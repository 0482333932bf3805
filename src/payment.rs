use crate::app::{ServiceError, ServiceResult};

const PAYMENT_INTENTS_URL: &str = "https://api.stripe.com/v1/payment_intents";

#[derive(Clone, Debug)]
pub struct PaymentIntent {
    pub client_secret: String,
}

/// Creates payment handles at the payment provider. The backend never
/// interprets the returned secret; the web client completes the charge.
pub trait PaymentService {
    fn create_payment_intent(&self, amount_cents: i64, currency: &str)
    -> ServiceResult<PaymentIntent>;
}

pub struct StripePaymentService;

impl PaymentService for StripePaymentService {
    // Blocking HTTP; callers on the async runtime go through spawn_blocking.
    fn create_payment_intent(
        &self,
        amount_cents: i64,
        currency: &str,
    ) -> ServiceResult<PaymentIntent> {
        if amount_cents <= 0 {
            return ServiceError::bad_request("Amount must be a positive number of cents");
        }
        let secret_key = std::env::var("MATRI_STRIPE_SECRET_KEY")
            .map_err(|_| ServiceError::Internal("MATRI_STRIPE_SECRET_KEY env var not set".into()))?;

        let client = reqwest::blocking::Client::new();
        let response = client
            .post(PAYMENT_INTENTS_URL)
            .basic_auth(&secret_key, None::<&str>)
            .form(&[
                ("amount", amount_cents.to_string()),
                ("currency", currency.to_string()),
                ("payment_method_types[]", "card".to_string()),
            ])
            .send()
            .map_err(|e| ServiceError::Internal(format!("Payment gateway request failed: {}", e)))?;

        if !response.status().is_success() {
            return ServiceError::internal(format!(
                "Payment gateway returned {}",
                response.status()
            ));
        }

        let body: serde_json::Value = response
            .json()
            .map_err(|e| ServiceError::Internal(format!("Invalid payment gateway response: {}", e)))?;
        let client_secret = body
            .get("client_secret")
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                ServiceError::Internal("Payment gateway response missing client secret".into())
            })?
            .to_string();

        Ok(PaymentIntent { client_secret })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_positive_amounts() {
        let service = StripePaymentService;
        assert!(matches!(
            service.create_payment_intent(0, "usd"),
            Err(ServiceError::BadRequest(..))
        ));
        assert!(matches!(
            service.create_payment_intent(-500, "usd"),
            Err(ServiceError::BadRequest(..))
        ));
    }
}
