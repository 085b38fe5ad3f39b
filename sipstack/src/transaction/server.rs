use async_trait::async_trait;

use crate::{
    endpoint::Endpoint,
    error::Result,
    message::SipMethod,
    transaction::{State, Transaction, TransactionInner},
    transport::{IncomingRequest, OutgoingResponse},
};
use std::ops::Deref;

/// Represents a Server Non INVITE transaction.
#[derive(Clone)]
pub struct ServerTransaction {
    transaction: TransactionInner,
}

impl ServerTransaction {
    pub(crate) fn new(endpoint: &Endpoint, request: &mut IncomingRequest) -> Result<Self> {
        assert!(
            !matches!(request.method(), SipMethod::Ack | SipMethod::Cancel | SipMethod::Invite),
            "Request method cannot be Ack, Cancel or Invite",
        );

        let tsx_layer = endpoint.get_tsx_layer();
        let transaction = TransactionInner::create_uas(request, endpoint);
        let uas = ServerTransaction { transaction };

        tsx_layer.add_server_tsx_to_map(uas.clone())?;
        request.set_tsx(uas.clone());

        Ok(uas)
    }

    #[allow(unused_variables)]
    pub(crate) async fn recv_msg<'a>(&self, msg: &IncomingRequest<'a>) -> Result<()> {
        if matches!(self.get_state(), State::Proceeding | State::Completed) {
            self.retransmit().await?;
        }

        Ok(())
    }

    pub async fn respond<'a>(&self, response: &mut OutgoingResponse<'a>) -> Result<()> {
        self.tsx_send_response(response).await?;

        let code = response.status_code().into_i32();

        match self.get_state() {
            State::Trying if (100..200).contains(&code) => {
                self.change_state_to(State::Proceeding);
            }
            State::Trying | State::Proceeding => {
                self.change_state_to(State::Completed);
                self.terminate();
            }
            _ => (),
        }

        Ok(())
    }
}

#[async_trait]
impl Transaction for ServerTransaction {
    fn terminate(&self) {
        if self.reliable() {
            self.on_terminated();
        } else {
            self.schedule_termination(Self::T1 * 64);
        }
    }
}

impl Deref for ServerTransaction {
    type Target = TransactionInner;

    fn deref(&self) -> &Self::Target {
        &self.transaction
    }
}

#[cfg(test)]
mod tests {
    use tokio::time::{self, Duration};

    use super::*;
    use crate::{message::StatusCode, transaction::mock};

    async fn tsx_uas_params<'a>() -> (Endpoint, IncomingRequest<'a>) {
        let endpoint = mock::default_endpoint().await;
        let request = mock::request(SipMethod::Options);

        (endpoint, request)
    }

    #[tokio::test]
    async fn test_receives_100_trying() {
        let (endpoint, mut request) = tsx_uas_params().await;
        let tsx = ServerTransaction::new(&endpoint, &mut request).unwrap();
        let response = &mut mock::response(StatusCode::Trying);

        tsx.respond(response).await.unwrap();

        assert!(tsx.last_status_code().unwrap().into_i32() == 100);
        assert!(tsx.get_state() == State::Proceeding);
    }

    #[tokio::test]
    async fn test_receives_200_ok() {
        let (endpoint, mut request) = tsx_uas_params().await;
        let tsx = ServerTransaction::new(&endpoint, &mut request).unwrap();
        let response = &mut mock::response(StatusCode::Ok);

        tsx.respond(response).await.unwrap();

        assert!(tsx.last_status_code().unwrap().into_i32() == 200);
        assert!(tsx.get_state() == State::Completed);
    }

    #[tokio::test]
    async fn test_retransmit_proceeding() {
        let (endpoint, mut request) = tsx_uas_params().await;
        let tsx = ServerTransaction::new(&endpoint, &mut request).unwrap();
        let response = &mut mock::response(StatusCode::Trying);
        let retrans = &mock::request(SipMethod::Options);

        tsx.respond(response).await.unwrap();
        tsx.recv_msg(retrans).await.unwrap();

        assert!(tsx.retrans_count() == 1);
        assert!(tsx.last_status_code().unwrap().into_i32() == 100);
        assert!(tsx.get_state() == State::Proceeding);
    }

    #[tokio::test]
    async fn test_retransmit_completed() {
        let (endpoint, mut request) = tsx_uas_params().await;
        let tsx = ServerTransaction::new(&endpoint, &mut request).unwrap();
        let response = &mut mock::response(StatusCode::Ok);
        let retrans = &mock::request(SipMethod::Options);

        tsx.respond(response).await.unwrap();
        tsx.recv_msg(retrans).await.unwrap();

        assert!(tsx.retrans_count() == 1);
        assert!(tsx.last_status_code().unwrap().into_i32() == 200);
        assert!(tsx.get_state() == State::Completed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_terminated_timer_j() {
        let (endpoint, mut request) = tsx_uas_params().await;
        let tsx = ServerTransaction::new(&endpoint, &mut request).unwrap();
        let response = &mut mock::response(StatusCode::Ok);

        tsx.respond(response).await.unwrap();

        time::sleep(ServerTransaction::T1 * 64 + Duration::from_millis(1)).await;

        assert!(tsx.last_status_code().unwrap().into_i32() == 200);
        assert!(tsx.get_state() == State::Terminated);
    }
}
