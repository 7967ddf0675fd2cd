//! Tests for the delivery processor's per-job state machine.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use crate::domain::ports::{
    DeliveryReceipt, MessageRepositoryError, MockMessageGateway, MockMessageRepository, SendJob,
};
use crate::domain::{
    Campaign, CampaignStatus, Channel, Customer, DeliveryProcessor, JobDisposition, MessageDetails,
    MessageStatus, OutboundMessage, RETRY_EXHAUSTED_ERROR,
};

fn details(retry_count: i32, status: MessageStatus) -> MessageDetails {
    MessageDetails {
        message: OutboundMessage {
            id: 10,
            campaign_id: 5,
            customer_id: 7,
            status,
            rendered_content: None,
            last_error: None,
            retry_count,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        },
        campaign: Campaign {
            id: 5,
            name: "Welcome".into(),
            channel: Channel::Sms,
            status: CampaignStatus::Sending,
            base_template: "Hi {first_name}!".into(),
            scheduled_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        },
        customer: Customer {
            id: 7,
            phone: "+15550001".into(),
            first_name: Some("Alice".into()),
            last_name: None,
            location: None,
            preferred_product: None,
            created_at: Utc::now(),
        },
    }
}

fn job() -> SendJob {
    SendJob {
        message_id: 10,
        campaign_id: 5,
        customer_id: 7,
    }
}

fn make_processor(
    messages: MockMessageRepository,
    gateway: MockMessageGateway,
) -> DeliveryProcessor<MockMessageRepository, MockMessageGateway> {
    DeliveryProcessor::new(Arc::new(messages), Arc::new(gateway))
}

#[tokio::test]
async fn successful_send_persists_rendered_content_and_acks() {
    let mut messages = MockMessageRepository::new();
    messages
        .expect_find_with_details()
        .times(1)
        .return_once(|_| Ok(Some(details(0, MessageStatus::Pending))));
    messages
        .expect_mark_sent()
        .withf(|id, rendered| *id == 10 && rendered == "Hi Alice!")
        .times(1)
        .return_once(|_, _| Ok(()));

    let mut gateway = MockMessageGateway::new();
    gateway
        .expect_send()
        .withf(|channel, phone, body| {
            *channel == Channel::Sms && phone == "+15550001" && body == "Hi Alice!"
        })
        .times(1)
        .return_once(|_, _, _| DeliveryReceipt::delivered(Duration::from_millis(80)));

    let processor = make_processor(messages, gateway);
    assert_eq!(processor.process(job()).await, JobDisposition::Ack);
}

#[tokio::test]
async fn missing_personalization_renders_empty_substitution() {
    let mut messages = MockMessageRepository::new();
    messages.expect_find_with_details().times(1).return_once(|_| {
        let mut d = details(0, MessageStatus::Pending);
        d.customer.first_name = None;
        Ok(Some(d))
    });
    messages
        .expect_mark_sent()
        .withf(|_, rendered| rendered == "Hi !")
        .times(1)
        .return_once(|_, _| Ok(()));

    let mut gateway = MockMessageGateway::new();
    gateway
        .expect_send()
        .times(1)
        .return_once(|_, _, _| DeliveryReceipt::delivered(Duration::from_millis(60)));

    let processor = make_processor(messages, gateway);
    assert_eq!(processor.process(job()).await, JobDisposition::Ack);
}

#[tokio::test]
async fn gateway_failure_records_the_attempt_and_requeues() {
    let mut messages = MockMessageRepository::new();
    messages
        .expect_find_with_details()
        .times(1)
        .return_once(|_| Ok(Some(details(0, MessageStatus::Pending))));
    messages
        .expect_record_failed_attempt()
        .withf(|id, reason| *id == 10 && reason == "network timeout")
        .times(1)
        .return_once(|_, _| Ok(()));

    let mut gateway = MockMessageGateway::new();
    gateway
        .expect_send()
        .times(1)
        .return_once(|_, _, _| DeliveryReceipt::rejected(Duration::from_millis(120), "network timeout"));

    let processor = make_processor(messages, gateway);
    assert_eq!(processor.process(job()).await, JobDisposition::Requeue);
}

#[tokio::test]
async fn exhausted_retries_terminalize_without_a_gateway_call() {
    let mut messages = MockMessageRepository::new();
    messages
        .expect_find_with_details()
        .times(1)
        .return_once(|_| Ok(Some(details(3, MessageStatus::Failed))));
    messages
        .expect_update_status()
        .withf(|id, status, error| {
            *id == 10
                && *status == MessageStatus::Failed
                && error.as_deref() == Some(RETRY_EXHAUSTED_ERROR)
        })
        .times(1)
        .return_once(|_, _, _| Ok(()));

    // No expectations on the gateway: any send call fails the test.
    let processor = make_processor(messages, MockMessageGateway::new());
    assert_eq!(processor.process(job()).await, JobDisposition::Ack);
}

#[tokio::test]
async fn load_failure_acks_the_job() {
    let mut messages = MockMessageRepository::new();
    messages
        .expect_find_with_details()
        .times(1)
        .return_once(|_| Err(MessageRepositoryError::connection("pool exhausted")));

    let processor = make_processor(messages, MockMessageGateway::new());
    assert_eq!(processor.process(job()).await, JobDisposition::Ack);
}

#[tokio::test]
async fn vanished_message_acks_the_job() {
    let mut messages = MockMessageRepository::new();
    messages
        .expect_find_with_details()
        .times(1)
        .return_once(|_| Ok(None));

    let processor = make_processor(messages, MockMessageGateway::new());
    assert_eq!(processor.process(job()).await, JobDisposition::Ack);
}

#[tokio::test]
async fn duplicate_delivery_after_success_is_idempotent() {
    let mut messages = MockMessageRepository::new();
    messages
        .expect_find_with_details()
        .times(1)
        .return_once(|_| Ok(Some(details(0, MessageStatus::Sent))));

    // Neither the gateway nor any write may run again.
    let processor = make_processor(messages, MockMessageGateway::new());
    assert_eq!(processor.process(job()).await, JobDisposition::Ack);
}

#[tokio::test]
async fn failed_success_write_requeues_for_reconciliation() {
    let mut messages = MockMessageRepository::new();
    messages
        .expect_find_with_details()
        .times(1)
        .return_once(|_| Ok(Some(details(0, MessageStatus::Pending))));
    messages
        .expect_mark_sent()
        .times(1)
        .return_once(|_, _| Err(MessageRepositoryError::query("write timed out")));

    let mut gateway = MockMessageGateway::new();
    gateway
        .expect_send()
        .times(1)
        .return_once(|_, _, _| DeliveryReceipt::delivered(Duration::from_millis(55)));

    let processor = make_processor(messages, gateway);
    assert_eq!(processor.process(job()).await, JobDisposition::Requeue);
}

/// A message doomed to fail is attempted exactly three times and
/// terminalized on the fourth delivery.
#[tokio::test]
async fn doomed_message_gets_three_attempts_then_terminalizes() {
    let deliveries = Arc::new(AtomicUsize::new(0));

    let mut messages = MockMessageRepository::new();
    let counter = Arc::clone(&deliveries);
    messages.expect_find_with_details().times(4).returning(move |_| {
        let n = counter.fetch_add(1, Ordering::SeqCst) as i32;
        let status = if n == 0 {
            MessageStatus::Pending
        } else {
            MessageStatus::Failed
        };
        Ok(Some(details(n, status)))
    });
    messages
        .expect_record_failed_attempt()
        .times(3)
        .returning(|_, _| Ok(()));
    messages
        .expect_update_status()
        .withf(|_, status, error| {
            *status == MessageStatus::Failed && error.as_deref() == Some(RETRY_EXHAUSTED_ERROR)
        })
        .times(1)
        .returning(|_, _, _| Ok(()));

    let mut gateway = MockMessageGateway::new();
    gateway
        .expect_send()
        .times(3)
        .returning(|_, _, _| DeliveryReceipt::rejected(Duration::from_millis(70), "rate limit exceeded"));

    let processor = make_processor(messages, gateway);

    for _ in 0..3 {
        assert_eq!(processor.process(job()).await, JobDisposition::Requeue);
    }
    assert_eq!(processor.process(job()).await, JobDisposition::Ack);
}

/// Retry-then-success: two failures followed by a delivered attempt leave
/// the message sent with its retry count intact.
#[tokio::test]
async fn retry_then_success_marks_sent() {
    let deliveries = Arc::new(AtomicUsize::new(0));

    let mut messages = MockMessageRepository::new();
    let counter = Arc::clone(&deliveries);
    messages.expect_find_with_details().times(3).returning(move |_| {
        let n = counter.fetch_add(1, Ordering::SeqCst) as i32;
        let status = if n == 0 {
            MessageStatus::Pending
        } else {
            MessageStatus::Failed
        };
        Ok(Some(details(n, status)))
    });
    messages
        .expect_record_failed_attempt()
        .times(2)
        .returning(|_, _| Ok(()));
    messages
        .expect_mark_sent()
        .withf(|_, rendered| rendered == "Hi Alice!")
        .times(1)
        .returning(|_, _| Ok(()));

    let attempts = Arc::new(AtomicUsize::new(0));
    let mut gateway = MockMessageGateway::new();
    let gateway_counter = Arc::clone(&attempts);
    gateway.expect_send().times(3).returning(move |_, _, _| {
        if gateway_counter.fetch_add(1, Ordering::SeqCst) < 2 {
            DeliveryReceipt::rejected(Duration::from_millis(90), "service temporarily unavailable")
        } else {
            DeliveryReceipt::delivered(Duration::from_millis(65))
        }
    });

    let processor = make_processor(messages, gateway);

    assert_eq!(processor.process(job()).await, JobDisposition::Requeue);
    assert_eq!(processor.process(job()).await, JobDisposition::Requeue);
    assert_eq!(processor.process(job()).await, JobDisposition::Ack);
    assert_eq!(attempts.load(Ordering::SeqCst), 3);
}
