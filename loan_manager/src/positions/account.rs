use common_errors::{
    ERROR_LOAN_INACTIVE, ERROR_LOAN_NOT_EMPTY, ERROR_LOAN_NOT_FOUND, ERROR_LOAN_TYPE_DEPRECATED,
    ERROR_LOAN_TYPE_NOT_FOUND, ERROR_NOT_LOAN_OWNER,
};
use common_structs::{LoanId, LoanType, LoanTypeId, UserLoan};

use crate::storage;

multiversx_sc::imports!();

#[multiversx_sc::module]
pub trait PositionAccountModule: storage::Storage + common_events::EventsModule {
    /// Opens an empty loan of `loan_type_id` owned by `account_id`.
    ///
    /// # Returns
    /// - The new loan id, allocated sequentially from 1.
    fn create_user_loan(&self, account_id: &ManagedBuffer, loan_type_id: LoanTypeId) -> LoanId {
        let loan_type = self.get_loan_type(loan_type_id);
        require!(!loan_type.is_deprecated, ERROR_LOAN_TYPE_DEPRECATED);

        let loan_id = self.last_loan_id().update(|id| {
            *id += 1;
            *id
        });
        self.user_loan(loan_id)
            .set(UserLoan::new(account_id.clone(), loan_type_id));

        self.create_user_loan_event(loan_id, account_id, loan_type_id);

        loan_id
    }

    /// Deactivates a loan. Only loans without collateral and borrows qualify.
    fn delete_user_loan(&self, loan_id: LoanId, account_id: &ManagedBuffer) {
        let mut loan = self.get_owned_loan(loan_id, account_id);
        require!(loan.is_empty(), ERROR_LOAN_NOT_EMPTY);

        loan.is_active = false;
        self.user_loan(loan_id).set(&loan);

        self.delete_user_loan_event(loan_id, account_id);
    }

    fn get_loan_type(&self, loan_type_id: LoanTypeId) -> LoanType<Self::Api> {
        let mapper = self.loan_type(loan_type_id);
        require!(!mapper.is_empty(), ERROR_LOAN_TYPE_NOT_FOUND);

        mapper.get()
    }

    fn get_active_loan(&self, loan_id: LoanId) -> UserLoan<Self::Api> {
        let mapper = self.user_loan(loan_id);
        require!(!mapper.is_empty(), ERROR_LOAN_NOT_FOUND);

        let loan = mapper.get();
        require!(loan.is_active, ERROR_LOAN_INACTIVE);

        loan
    }

    fn get_owned_loan(&self, loan_id: LoanId, account_id: &ManagedBuffer) -> UserLoan<Self::Api> {
        let loan = self.get_active_loan(loan_id);
        require!(&loan.account_id == account_id, ERROR_NOT_LOAN_OWNER);

        loan
    }
}
